//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.bazel-xcodeproj/config.toml` - User-wide defaults
//! - Project: `<workspace>/.bazel-xcodeproj/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and a file passed on
//! the command line takes precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the configuration directory, both globally and in a workspace.
pub const CONFIG_DIR_NAME: &str = ".bazel-xcodeproj";

/// Default project name.
pub const DEFAULT_PROJECT_NAME: &str = "Project";

/// Default development region.
pub const DEFAULT_DEVELOPMENT_REGION: &str = "en";

/// Xcode configuration assigned to targets that list none.
pub const DEFAULT_XCODE_CONFIGURATION: &str = "Debug";

/// Default path of the internal tooling group.
pub const DEFAULT_INTERNAL_DIRECTORY: &str = "bazel_xcodeproj";

/// Generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project settings
    pub project: ProjectConfig,

    /// Generation settings
    pub generate: GenerateConfig,
}

/// Project-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name
    pub name: Option<String>,

    /// Development region, always part of the known regions
    pub development_region: Option<String>,
}

/// Generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Worker count for the parallel phase (None = auto-detect)
    pub jobs: Option<usize>,

    /// Xcode configuration for targets that list none
    pub default_xcode_configuration: Option<String>,

    /// Path of the internal tooling group, relative to the project
    pub internal_directory: Option<String>,
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
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.project.name.is_some() {
            self.project.name = other.project.name;
        }
        if other.project.development_region.is_some() {
            self.project.development_region = other.project.development_region;
        }

        if other.generate.jobs.is_some() {
            self.generate.jobs = other.generate.jobs;
        }
        if other.generate.default_xcode_configuration.is_some() {
            self.generate.default_xcode_configuration =
                other.generate.default_xcode_configuration;
        }
        if other.generate.internal_directory.is_some() {
            self.generate.internal_directory = other.generate.internal_directory;
        }
    }

    /// The project name.
    pub fn project_name(&self) -> &str {
        self.project.name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME)
    }

    /// The development region.
    pub fn development_region(&self) -> &str {
        self.project
            .development_region
            .as_deref()
            .unwrap_or(DEFAULT_DEVELOPMENT_REGION)
    }

    /// The Xcode configuration assigned to targets that list none.
    pub fn default_xcode_configuration(&self) -> &str {
        self.generate
            .default_xcode_configuration
            .as_deref()
            .unwrap_or(DEFAULT_XCODE_CONFIGURATION)
    }

    /// The path of the internal tooling group.
    pub fn internal_directory(&self) -> &str {
        self.generate
            .internal_directory
            .as_deref()
            .unwrap_or(DEFAULT_INTERNAL_DIRECTORY)
    }
}

/// Load merged configuration.
///
/// Order of precedence (highest to lowest):
/// 1. Explicit config file (must exist and parse)
/// 2. Project config (`<workspace>/.bazel-xcodeproj/config.toml`)
/// 3. Global config (`~/.bazel-xcodeproj/config.toml`)
/// 4. Defaults
pub fn load_config(
    global_path: Option<&Path>,
    project_path: &Path,
    explicit_path: Option<&Path>,
) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    if let Some(explicit_path) = explicit_path {
        config.merge(Config::load(explicit_path)?);
    }

    Ok(config)
}

/// Get the global config directory (`~/.bazel-xcodeproj`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (`~/.bazel-xcodeproj/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`<workspace>/.bazel-xcodeproj/config.toml`).
pub fn project_config_path(workspace: &Path) -> PathBuf {
    workspace.join(CONFIG_DIR_NAME).join("config.toml")
}
