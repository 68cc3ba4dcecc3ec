//! Summary page rendering
//!
//! Consumes the collector's records and writes the aggregated summary
//! page at the output root. Purely presentational: formatting decisions
//! (two decimals, `%` suffix, `N/A`) live here and nowhere else.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{ModuleCoverageRecord, ReportEntry};

/// File name of the rendered summary page.
pub const SUMMARY_FILE: &str = "index.html";

/// Render the summary and write it as `index.html` under `output_root`.
pub fn write_summary(
    project_name: &str,
    records: &[ModuleCoverageRecord],
    output_root: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_root)
        .with_context(|| format!("Could not create {}", output_root.display()))?;

    let path = output_root.join(SUMMARY_FILE);
    fs::write(&path, render(project_name, records))
        .with_context(|| format!("Could not write {}", path.display()))?;

    Ok(path)
}

/// Build the summary page: one row per module report, linking into the
/// copied report trees.
pub fn render(project_name: &str, records: &[ModuleCoverageRecord]) -> String {
    // module name then kind, so output is stable however the tree was walked
    let mut sorted: Vec<&ModuleCoverageRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.module_name.cmp(&b.module_name));

    let mut rows = String::new();
    for record in sorted {
        if record.reports.is_empty() {
            rows.push_str(&format!(
                "        <tr><td>{}</td><td>no reports</td>{}</tr>\n",
                record.module_name,
                metric_cell(None)
            ));
            continue;
        }

        let mut reports: Vec<&ReportEntry> = record.reports.iter().collect();
        reports.sort_by_key(|e| e.kind);
        for entry in reports {
            rows.push_str(&format!(
                "        <tr><td>{module}</td><td><a href=\"{module}/{dir}/index.html\">{kind}</a></td>{metric}</tr>\n",
                module = record.module_name,
                dir = entry.dir_name(),
                kind = entry.kind,
                metric = metric_cell(entry.metric),
            ));
        }
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{project_name} - Code Test Coverage</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 40px;
            color: #222;
        }}
        h1 {{ font-size: 24px; }}
        .generated {{ color: #888; font-size: 12px; margin-bottom: 20px; }}
        table {{ border-collapse: collapse; min-width: 480px; }}
        th, td {{ padding: 8px 14px; text-align: left; border: 1px solid #ccc; }}
        th {{ background: #f0f0f0; }}
        tr:nth-child(even) {{ background: #fafafa; }}
        td.na {{ color: #888; }}
    </style>
</head>
<body>
    <h1>{project_name} - Aggregated Code Coverage Report</h1>
    <p class="generated">Generated {timestamp}</p>
    <table>
        <tr><th>Module</th><th>Report</th><th>Coverage</th></tr>
{rows}    </table>
</body>
</html>
"##,
        project_name = project_name,
        timestamp = timestamp,
        rows = rows,
    )
}

/// Format a metric the way the summary table shows it.
pub fn format_metric(metric: Option<f64>) -> String {
    match metric {
        Some(value) => format!("{:.2}%", value),
        None => "N/A".to_string(),
    }
}

fn metric_cell(metric: Option<f64>) -> String {
    match metric {
        Some(_) => format!("<td>{}</td>", format_metric(metric)),
        None => format!(r#"<td class="na">{}</td>"#, format_metric(None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ReportEntry, ReportKind};
    use std::path::PathBuf;

    fn record(name: &str, entries: Vec<(&str, ReportKind, Option<f64>)>) -> ModuleCoverageRecord {
        let mut record = ModuleCoverageRecord::new(name);
        for (dir, kind, metric) in entries {
            record.push_report(ReportEntry {
                source_dir: PathBuf::from(dir),
                kind,
                metric,
            });
        }
        record
    }

    #[test]
    fn test_rows_link_into_copied_trees() {
        let records = vec![record(
            "core",
            vec![
                ("core/target/site/jacoco-ut", ReportKind::Unit, Some(85.0)),
                ("core/target/site/jacoco-it", ReportKind::Integration, None),
            ],
        )];

        let html = render("acme", &records);
        assert!(html.contains("acme - Aggregated Code Coverage Report"));
        assert!(html.contains(r#"<a href="core/jacoco-ut/index.html">unit tests</a>"#));
        assert!(html.contains(r#"<a href="core/jacoco-it/index.html">integration tests</a>"#));
        assert!(html.contains("85.00%"));
        assert!(html.contains("N/A"));
    }

    #[test]
    fn test_rows_sorted_by_module_name() {
        let records = vec![
            record("zeta", vec![("z/target/site/jacoco-ut", ReportKind::Unit, Some(10.0))]),
            record("alpha", vec![("a/target/site/jacoco-ut", ReportKind::Unit, Some(20.0))]),
        ];

        let html = render("acme", &records);
        let alpha = html.find("<td>alpha</td>").unwrap();
        let zeta = html.find("<td>zeta</td>").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_empty_record_renders_na_row() {
        let records = vec![record("bare", vec![])];

        let html = render("acme", &records);
        assert!(html.contains(r#"<td>bare</td><td>no reports</td><td class="na">N/A</td>"#));
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(85.0)), "85.00%");
        assert_eq!(format_metric(Some(87.5)), "87.50%");
        assert_eq!(format_metric(None), "N/A");
    }
}
