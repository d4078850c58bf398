//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub container: ContainerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Container behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Let a later module binding for a name replace an earlier one.
    #[serde(default)]
    pub override_required_modules: bool,

    /// List `dev-` commands in help output.
    #[serde(default)]
    pub include_dev_commands: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write a daily rolling log file.
    #[serde(default = "default_file")]
    pub file: bool,

    /// Log directory. Defaults to `~/.trellis/logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_file(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    /// Resolved log directory with `~` expanded.
    pub fn log_directory(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => PathBuf::from(ConfigLoader::expand_path(dir)),
            None => trellis_home().join("logs"),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file() -> bool {
    true
}

/// `~/.trellis`, or `./.trellis` when there is no home directory.
pub fn trellis_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trellis")
}
