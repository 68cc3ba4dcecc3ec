use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::metric::DEFAULT_METRIC_COLUMN;
use crate::record::ReportKind;

/// Manifest file name, looked up at the root and in module directories.
pub const CONFIG_FILE: &str = "covx.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub project: Project,
    /// Child module directories or glob patterns. Present (even empty)
    /// means this node is an aggregator with no build output of its own.
    #[serde(default)]
    pub modules: Option<Vec<String>>,
    #[serde(default)]
    pub reports: ReportLayout,
}

#[derive(Debug, Deserialize)]
pub struct Project {
    pub name: String,
}

/// Where coverage reports live under a module and where copies land.
/// Defaults follow the JaCoCo site conventions.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportLayout {
    /// Build-output directory holding report directories, relative to a
    /// module's base directory. A module without it is treated as unbuilt.
    #[serde(default = "default_site_dir")]
    pub site_dir: String,
    /// Unit-test report directory name under `site_dir`.
    #[serde(default = "default_unit_dir")]
    pub unit_dir: String,
    /// Integration-test report directory name under `site_dir`.
    #[serde(default = "default_integration_dir")]
    pub integration_dir: String,
    /// Unified output root, relative to the root project directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Render modules that produced no reports as N/A rows instead of
    /// dropping them from the summary.
    #[serde(default)]
    pub include_missing: bool,
    /// 0-based summary-table column holding the percentage.
    #[serde(default = "default_metric_column")]
    pub metric_column: usize,
}

fn default_site_dir() -> String {
    "target/site".to_string()
}

fn default_unit_dir() -> String {
    "jacoco-ut".to_string()
}

fn default_integration_dir() -> String {
    "jacoco-it".to_string()
}

fn default_output_dir() -> String {
    "target/site/jacoco".to_string()
}

fn default_metric_column() -> usize {
    DEFAULT_METRIC_COLUMN
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            site_dir: default_site_dir(),
            unit_dir: default_unit_dir(),
            integration_dir: default_integration_dir(),
            output_dir: default_output_dir(),
            include_missing: false,
            metric_column: default_metric_column(),
        }
    }
}

impl ReportLayout {
    pub fn kind_dir(&self, kind: ReportKind) -> &str {
        match kind {
            ReportKind::Unit => &self.unit_dir,
            ReportKind::Integration => &self.integration_dir,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            anyhow::bail!("Project name must not be empty");
        }
        if self.reports.site_dir.is_empty() || self.reports.output_dir.is_empty() {
            anyhow::bail!("Report directories must not be empty");
        }
        if self.reports.unit_dir == self.reports.integration_dir {
            anyhow::bail!(
                "Unit and integration report directories must differ (both are '{}')",
                self.reports.unit_dir
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[project]
name = "acme-parent"

modules = ["core", "plugins/*"]

[reports]
output_dir = "target/site/coverage"
include_missing = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.project.name, "acme-parent");
        assert_eq!(
            config.modules.as_deref(),
            Some(&["core".to_string(), "plugins/*".to_string()][..])
        );
        assert_eq!(config.reports.output_dir, "target/site/coverage");
        assert!(config.reports.include_missing);
        // untouched fields keep the JaCoCo conventions
        assert_eq!(config.reports.site_dir, "target/site");
        assert_eq!(config.reports.unit_dir, "jacoco-ut");
        assert_eq!(config.reports.integration_dir, "jacoco-it");
        assert_eq!(config.reports.metric_column, 2);
    }

    #[test]
    fn test_leaf_manifest_has_no_modules() {
        let config: Config = toml::from_str("[project]\nname = \"core\"\n").unwrap();
        assert!(config.modules.is_none());
    }

    #[test]
    fn test_same_kind_dirs_rejected() {
        let toml_content = r#"
[project]
name = "bad"

[reports]
unit_dir = "jacoco"
integration_dir = "jacoco"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kind_dir_lookup() {
        let layout = ReportLayout::default();
        assert_eq!(layout.kind_dir(ReportKind::Unit), "jacoco-ut");
        assert_eq!(layout.kind_dir(ReportKind::Integration), "jacoco-it");
    }
}
