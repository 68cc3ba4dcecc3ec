//! Covx - Coverage Report Aggregator
//!
//! A library for rolling per-module coverage reports up into one
//! summary page:
//! - Manifest-driven discovery of nested sub-projects
//! - Summary-table scraping with a tolerant HTML reader
//! - Idempotent copying of report trees into a unified output root
//! - A static summary page linking every module to its report

pub mod collector;
pub mod config;
pub mod metric;
pub mod project;
pub mod record;
pub mod summary;

pub use collector::{CoverageSummary, ReportCollector};
pub use config::{Config, ReportLayout};
pub use metric::MetricExtractor;
pub use project::Project;
pub use record::{ModuleCoverageRecord, ReportEntry, ReportKind};
