//! Per-module coverage records
//!
//! Value types produced by collection: one record per build module,
//! carrying the reports discovered for it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Kind of coverage report, identified by conventional directory naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    Unit,
    Integration,
}

impl ReportKind {
    /// All kinds, in the order they are looked up under a module.
    pub const ALL: [ReportKind; 2] = [ReportKind::Unit, ReportKind::Integration];

    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Unit => "unit tests",
            ReportKind::Integration => "integration tests",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One coverage report discovered for a module.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    /// Directory holding the third-party report (contains `index.html`).
    pub source_dir: PathBuf,
    pub kind: ReportKind,
    /// Aggregate percentage in `[0, 100]`, or `None` when the report's
    /// summary table yielded no parseable value.
    pub metric: Option<f64>,
}

impl ReportEntry {
    /// Name of the report directory; copies keep it, so links are
    /// `<module>/<dir_name>/index.html`.
    pub fn dir_name(&self) -> String {
        self.source_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Coverage reports found for one build module.
///
/// Identity is the module name alone; the report list does not
/// participate in equality or hashing, which is what makes
/// dedup-by-module-name work during collection.
#[derive(Debug, Clone)]
pub struct ModuleCoverageRecord {
    pub module_name: String,
    pub reports: Vec<ReportEntry>,
}

impl ModuleCoverageRecord {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            reports: Vec::new(),
        }
    }

    pub fn push_report(&mut self, entry: ReportEntry) {
        self.reports.push(entry);
    }
}

impl PartialEq for ModuleCoverageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.module_name == other.module_name
    }
}

impl Eq for ModuleCoverageRecord {}

impl Hash for ModuleCoverageRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.module_name.hash(state);
    }
}
