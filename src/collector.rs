//! Report collection
//!
//! Walks the project tree, detects per-module coverage report
//! directories, extracts a metric from each and copies the report trees
//! into the unified output root. Per-module problems are logged and
//! counted, never fatal; only a broken project tree aborts the run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ReportLayout;
use crate::metric::MetricExtractor;
use crate::project::Project;
use crate::record::{ModuleCoverageRecord, ReportEntry, ReportKind};

/// Report index file inside every report directory.
pub const INDEX_FILE: &str = "index.html";

/// Outcome of a collection run.
#[derive(Debug, Default)]
pub struct CoverageSummary {
    /// One record per module, deduplicated by name, in traversal order.
    pub records: Vec<ModuleCoverageRecord>,
    /// Problems that were swallowed along the way: unreadable metrics,
    /// failed copies, duplicate module names.
    pub warnings: u32,
}

pub struct ReportCollector<'a> {
    layout: &'a ReportLayout,
    extractor: MetricExtractor,
    /// Unified destination for report copies; `None` scans without copying.
    output_root: Option<PathBuf>,
}

impl<'a> ReportCollector<'a> {
    /// A collector that copies every discovered report under
    /// `<root_dir>/<output_dir>`.
    pub fn new(layout: &'a ReportLayout, root_dir: &Path) -> Self {
        Self {
            layout,
            extractor: MetricExtractor::new(layout.metric_column),
            output_root: Some(root_dir.join(&layout.output_dir)),
        }
    }

    /// A collector that extracts metrics but leaves the filesystem alone.
    pub fn scan_only(layout: &'a ReportLayout) -> Self {
        Self {
            layout,
            extractor: MetricExtractor::new(layout.metric_column),
            output_root: None,
        }
    }

    /// Collect coverage records for the whole project tree.
    pub fn collect(&self, project: Option<&Project>) -> Result<CoverageSummary> {
        let mut summary = CoverageSummary::default();

        if let Some(project) = project {
            self.visit(project, &mut summary)?;
        }

        if !self.layout.include_missing {
            summary.records.retain(|r| !r.reports.is_empty());
        }

        Ok(summary)
    }

    fn visit(&self, project: &Project, summary: &mut CoverageSummary) -> Result<()> {
        if project.is_aggregator() {
            for child in project.children() {
                self.visit(child, summary)?;
            }
            return Ok(());
        }

        let site_dir = project.base_dir().join(&self.layout.site_dir);
        if !site_dir.is_dir() {
            // module has not been built/tested, nothing to report
            return Ok(());
        }

        // records are keyed on the module name, so a name collision
        // between sub-trees drops the later module entirely
        if summary
            .records
            .iter()
            .any(|r| r.module_name == project.module_id())
        {
            eprintln!(
                "Warning: duplicate module name '{}'; keeping the first occurrence",
                project.module_id()
            );
            summary.warnings += 1;
            return Ok(());
        }

        let mut record = ModuleCoverageRecord::new(project.module_id());

        for kind in ReportKind::ALL {
            let source_dir = site_dir.join(self.layout.kind_dir(kind));
            if !source_dir.is_dir() {
                continue;
            }

            let metric = self.extractor.extract(&source_dir.join(INDEX_FILE));
            if metric.is_none() {
                summary.warnings += 1;
            }

            if let Err(e) = self.copy_report(&source_dir, project.module_id()) {
                eprintln!(
                    "Warning: failed to copy report {}: {:#}",
                    source_dir.display(),
                    e
                );
                summary.warnings += 1;
                continue;
            }

            record.push_report(ReportEntry {
                source_dir,
                kind,
                metric,
            });
        }

        summary.records.push(record);

        Ok(())
    }

    /// Copy a report tree to `<output_root>/<module_id>/<dir_name>`,
    /// replacing whatever a previous run left there.
    fn copy_report(&self, source_dir: &Path, module_id: &str) -> Result<()> {
        let output_root = match &self.output_root {
            Some(root) => root,
            None => return Ok(()),
        };

        let dir_name = source_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let dest = output_root.join(module_id).join(dir_name);

        if dest.exists() {
            fs::remove_dir_all(&dest)
                .with_context(|| format!("Could not clear {}", dest.display()))?;
        }

        for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(source_dir)
                .with_context(|| format!("Walked outside {}", source_dir.display()))?;
            let target = dest.join(rel);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Could not create {}", target.display()))?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Could not create {}", parent.display()))?;
                }
                fs::copy(entry.path(), &target).with_context(|| {
                    format!(
                        "Could not copy {} to {}",
                        entry.path().display(),
                        target.display()
                    )
                })?;
            }
        }

        Ok(())
    }
}
