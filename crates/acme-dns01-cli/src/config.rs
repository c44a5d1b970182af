//! Configuration management.

use std::path::{Path, PathBuf};

use acme_dns01::ResolverSettings;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// CLI configuration.
///
/// ```toml
/// output_format = "json"
///
/// [resolver]
/// nameservers = ["1.1.1.1", "8.8.8.8"]
/// timeout_ms = 3000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolver used for challenge lookups.
    pub resolver: ResolverSettings,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "kelunik", "dns01-check")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. The default location is optional and
    /// yields the default configuration when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}
