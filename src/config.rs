//! Optional TOML configuration.
//!
//! ```toml
//! [output]
//! color = false
//! format = "json"
//! summary = true
//! ```
//!
//! Command-line flags always win over values read here.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::error::{DiffError, DiffResult};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "iptables-diff.toml";

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
    pub format: OutputFormat,
    /// Print a one-line summary after the report.
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Text,
            summary: false,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> DiffResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `./iptables-diff.toml` and
    /// then the user config directory are tried; if neither exists the
    /// defaults are used.
    pub fn load(explicit: Option<&Path>) -> DiffResult<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        match search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::read(&path),
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> DiffResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DiffError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)
            .map_err(|e| DiffError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("iptables-diff").join("config.toml"));
    }
    paths
}
