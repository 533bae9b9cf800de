//! Per-invocation context handed to the plugin hooks.

use std::path::PathBuf;

use crate::capability::Project;
use crate::config::ConfigMap;

/// What the host knows about the current deploy
#[derive(Debug, Clone, Default)]
pub struct DeployContext {
    /// Build output directory
    pub dist_dir: PathBuf,
    /// Build outputs relative to `dist_dir`
    pub dist_files: Vec<String>,
    /// The plugin's configuration values
    pub config: ConfigMap,
    /// Project descriptor (name, browser targets)
    pub project: Project,
}

impl DeployContext {
    /// Create a context for a dist directory and its files
    pub fn new(dist_dir: impl Into<PathBuf>, dist_files: Vec<String>) -> Self {
        Self {
            dist_dir: dist_dir.into(),
            dist_files,
            ..Default::default()
        }
    }

    /// Set plugin configuration
    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    /// Set the project descriptor
    pub fn with_project(mut self, project: Project) -> Self {
        self.project = project;
        self
    }
}
