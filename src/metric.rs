//! Coverage metric extraction
//!
//! Scrapes the aggregate percentage out of a third-party coverage
//! report page. The layout contract is positional: the first table in
//! the document is the summary table, its first row is the header, and
//! the percentage lives in a fixed `td` column of every other row.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// 0-based `td` index of the percentage cell in a summary-table row.
/// Column 2 is where JaCoCo puts its coverage ratio.
pub const DEFAULT_METRIC_COLUMN: usize = 2;

/// Extraction strategy for a report's summary table.
///
/// The metric is the unweighted mean of every percentage found in the
/// configured column, one value per data row. Rows whose cell holds no
/// `%`, or whose stripped text does not parse as a number, are skipped
/// outright; they never count as zero.
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    /// Which `td` cell of each row holds the percentage.
    pub column: usize,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self {
            column: DEFAULT_METRIC_COLUMN,
        }
    }
}

impl MetricExtractor {
    pub fn new(column: usize) -> Self {
        Self { column }
    }

    /// Extract the aggregate percentage from a report index file.
    ///
    /// Never fails: a missing, unreadable or malformed report yields
    /// `None`, so one broken module cannot abort the whole run.
    pub fn extract(&self, index_html: &Path) -> Option<f64> {
        let content = match fs::read_to_string(index_html) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "Warning: could not read report {}: {}",
                    index_html.display(),
                    e
                );
                return None;
            }
        };
        self.extract_str(&content)
    }

    /// Extract the aggregate percentage from report HTML.
    pub fn extract_str(&self, html: &str) -> Option<f64> {
        let mut reader = Reader::from_str(html);
        reader.trim_text(true);
        // Report pages are HTML, not XML; tolerate unmatched end tags
        // (<br>, <img>, ...) instead of rejecting the document.
        reader.check_end_names(false);

        let mut sum = 0.0f64;
        let mut row_count = 0u32;

        let mut in_table = false; // inside the first (summary) table
        let mut nested = 0u32; // tables nested inside it are ignored wholesale
        let mut rows_seen = 0usize;
        let mut current_row: Option<usize> = None;
        let mut cell_count = 0usize; // `td` cells seen in the current row
        let mut capture: Option<String> = None;

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    let name = name.as_ref();
                    if name.eq_ignore_ascii_case(b"table") {
                        if in_table {
                            nested += 1;
                        } else {
                            in_table = true;
                        }
                    } else if in_table && nested == 0 {
                        if name.eq_ignore_ascii_case(b"tr") {
                            current_row = Some(rows_seen);
                            rows_seen += 1;
                            cell_count = 0;
                        } else if name.eq_ignore_ascii_case(b"td") {
                            // `th` cells do not advance the index
                            let index = cell_count;
                            cell_count += 1;
                            // row 0 is the column names, skip it
                            if current_row.map(|r| r > 0).unwrap_or(false) && index == self.column
                            {
                                capture = Some(String::new());
                            }
                        }
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    let name = name.as_ref();
                    if name.eq_ignore_ascii_case(b"table") && !in_table {
                        // an empty first table has no rows to scan
                        break;
                    }
                    if in_table && nested == 0 && name.eq_ignore_ascii_case(b"td") {
                        cell_count += 1;
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(text) = capture.as_mut() {
                        text.push_str(&e.unescape().unwrap_or_default());
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.local_name();
                    let name = name.as_ref();
                    if name.eq_ignore_ascii_case(b"table") {
                        if nested > 0 {
                            nested -= 1;
                        } else if in_table {
                            // only the first table is the summary table
                            break;
                        }
                    } else if in_table && nested == 0 {
                        if name.eq_ignore_ascii_case(b"tr") {
                            current_row = None;
                        } else if name.eq_ignore_ascii_case(b"td") {
                            if let Some(text) = capture.take() {
                                if text.contains('%') {
                                    // a cell that fails to parse is skipped,
                                    // not counted as zero
                                    if let Ok(value) = text.replace('%', "").trim().parse::<f64>()
                                    {
                                        sum += value;
                                        row_count += 1;
                                    }
                                }
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    eprintln!("Warning: malformed report HTML: {}", e);
                    return None;
                }
                _ => {}
            }
            buf.clear();
        }

        if row_count > 0 {
            Some(sum / row_count as f64)
        } else {
            None
        }
    }
}
