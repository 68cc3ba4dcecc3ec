//! Project tree discovery
//!
//! A multi-module build is described by `covx.toml` manifests. A
//! manifest that lists `modules` is an aggregator node: it groups
//! sub-projects and produces no build output of its own. Module entries
//! are directories or glob patterns relative to the manifest, each
//! discovered recursively. A module directory without a manifest is a
//! leaf named after the directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};

/// A node in the project tree.
#[derive(Debug)]
pub struct Project {
    name: String,
    base_dir: PathBuf,
    aggregator: bool,
    children: Vec<Project>,
}

impl Project {
    /// A buildable module with no sub-projects.
    pub fn leaf(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_dir: base_dir.into(),
            aggregator: false,
            children: Vec::new(),
        }
    }

    /// A grouping node; contributes no record of its own.
    pub fn aggregator(
        name: impl Into<String>,
        base_dir: impl Into<PathBuf>,
        children: Vec<Project>,
    ) -> Self {
        Self {
            name: name.into(),
            base_dir: base_dir.into(),
            aggregator: true,
            children,
        }
    }

    pub fn module_id(&self) -> &str {
        &self.name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn is_aggregator(&self) -> bool {
        self.aggregator
    }

    /// Child projects, in manifest order.
    pub fn children(&self) -> &[Project] {
        &self.children
    }

    /// Build the project tree rooted at `root_dir` from a loaded root
    /// manifest.
    ///
    /// Fails when the tree itself cannot be enumerated (missing module
    /// directory, unreadable manifest, bad glob pattern); a failure here
    /// aborts the whole run so no partial summary gets rendered.
    pub fn discover(root_dir: &Path, config: &Config) -> Result<Self> {
        let name = config.project.name.clone();
        match &config.modules {
            Some(patterns) => {
                let children = discover_children(root_dir, patterns)?;
                Ok(Self::aggregator(name, root_dir, children))
            }
            None => Ok(Self::leaf(name, root_dir)),
        }
    }
}

fn discover_children(base_dir: &Path, patterns: &[String]) -> Result<Vec<Project>> {
    let mut children = Vec::new();

    for pattern in patterns {
        if is_glob(pattern) {
            let full_pattern = base_dir.join(pattern);
            let full_pattern = full_pattern.to_string_lossy();

            // glob yields matches in alphabetical order, which keeps
            // traversal deterministic
            for entry in glob::glob(&full_pattern)
                .with_context(|| format!("Invalid module pattern '{}'", pattern))?
            {
                let path = entry
                    .with_context(|| format!("Could not read a match of module pattern '{}'", pattern))?;
                if path.is_dir() {
                    children.push(discover_dir(&path)?);
                }
            }
        } else {
            let dir = base_dir.join(pattern);
            if !dir.is_dir() {
                anyhow::bail!(
                    "Module directory '{}' does not exist under {}",
                    pattern,
                    base_dir.display()
                );
            }
            children.push(discover_dir(&dir)?);
        }
    }

    Ok(children)
}

fn is_glob(pattern: &str) -> bool {
    pattern.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// Discover one module directory: with a manifest it may itself be an
/// aggregator, without one it is a leaf named after the directory.
fn discover_dir(dir: &Path) -> Result<Project> {
    let manifest = dir.join(CONFIG_FILE);
    if manifest.exists() {
        let config = Config::load(&manifest)?;
        Project::discover(dir, &config)
    } else {
        let name = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "module".to_string());
        Ok(Project::leaf(name, dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn root_config(toml_content: &str) -> Config {
        toml::from_str(toml_content).unwrap()
    }

    #[test]
    fn test_leaf_without_modules() {
        let dir = tempdir().unwrap();
        let config = root_config("[project]\nname = \"solo\"\n");

        let project = Project::discover(dir.path(), &config).unwrap();
        assert!(!project.is_aggregator());
        assert_eq!(project.module_id(), "solo");
        assert!(project.children().is_empty());
    }

    #[test]
    fn test_aggregator_with_literal_and_glob_modules() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("core")).unwrap();
        fs::create_dir_all(dir.path().join("plugins/alpha")).unwrap();
        fs::create_dir_all(dir.path().join("plugins/beta")).unwrap();

        let config = root_config(
            "[project]\nname = \"parent\"\nmodules = [\"core\", \"plugins/*\"]\n",
        );

        let project = Project::discover(dir.path(), &config).unwrap();
        assert!(project.is_aggregator());

        let names: Vec<&str> = project.children().iter().map(|c| c.module_id()).collect();
        assert_eq!(names, vec!["core", "alpha", "beta"]);
        assert!(project.children().iter().all(|c| !c.is_aggregator()));
    }

    #[test]
    fn test_child_manifest_names_and_nests() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        fs::write(
            dir.path().join("sub/covx.toml"),
            "[project]\nname = \"sub-parent\"\nmodules = [\"inner\"]\n",
        )
        .unwrap();

        let config = root_config("[project]\nname = \"parent\"\nmodules = [\"sub\"]\n");

        let project = Project::discover(dir.path(), &config).unwrap();
        let sub = &project.children()[0];
        assert_eq!(sub.module_id(), "sub-parent");
        assert!(sub.is_aggregator());
        assert_eq!(sub.children()[0].module_id(), "inner");
    }

    #[test]
    fn test_missing_module_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let config = root_config("[project]\nname = \"parent\"\nmodules = [\"gone\"]\n");

        assert!(Project::discover(dir.path(), &config).is_err());
    }

    #[test]
    fn test_empty_aggregator() {
        let dir = tempdir().unwrap();
        let config = root_config("[project]\nname = \"parent\"\nmodules = []\n");

        let project = Project::discover(dir.path(), &config).unwrap();
        assert!(project.is_aggregator());
        assert!(project.children().is_empty());
    }
}
