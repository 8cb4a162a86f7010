//! Configuration file support for testbuild.
//!
//! Testbuild supports two configuration file locations:
//! - Global: `~/.testbuild/config.toml` - User-wide defaults
//! - Project: `.testbuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::variant::{VariantKind, DEFAULT_DOTNET_LAUNCHER};

/// Testbuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task settings
    pub task: TaskConfig,

    /// Managed variant settings
    pub managed: ManagedConfig,
}

/// Task-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Default test variant (native, managed)
    pub variant: Option<VariantKind>,
}

/// Managed test harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagedConfig {
    /// Runtime launcher used to run managed harnesses
    pub launcher: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.task.variant.is_some() {
            self.task.variant = other.task.variant;
        }
        if other.managed.launcher.is_some() {
            self.managed.launcher = other.managed.launcher;
        }
    }

    /// The configured variant, or native.
    pub fn variant(&self) -> VariantKind {
        self.task.variant.unwrap_or_default()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.testbuild/config.toml)
/// 2. Global config (~/.testbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global testbuild config directory (~/.testbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".testbuild"))
}

/// Get the global config path (~/.testbuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.testbuild/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".testbuild").join("config.toml")
}

/// Resolve the managed runtime launcher.
///
/// Order: explicit path, config, `dotnet` on the search path, then the
/// built-in default.
pub fn resolve_launcher(explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Some(path) = &config.managed.launcher {
        return path.clone();
    }
    match which::which("dotnet") {
        Ok(path) => {
            tracing::debug!("found dotnet at {}", path.display());
            path
        }
        Err(_) => {
            tracing::debug!("dotnet not on PATH, using {}", DEFAULT_DOTNET_LAUNCHER);
            PathBuf::from(DEFAULT_DOTNET_LAUNCHER)
        }
    }
}
