use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MonobumpError, Result};

/// File name searched in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "monobump.toml";

/// Represents the complete configuration for monobump.
///
/// Contains component discovery settings, commit classification rules and tag options.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub monorepo: MonorepoConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub tag: TagConfig,
}

/// Where component versioning documents live and which key holds the version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MonorepoConfig {
    /// Glob relative to the repository root, e.g. `packages/*/package.json`
    #[serde(default)]
    pub versioning_file: Option<String>,

    /// Path expression addressing the version inside each document
    #[serde(default = "default_version_path")]
    pub path: String,
}

fn default_version_path() -> String {
    "version".to_string()
}

impl Default for MonorepoConfig {
    fn default() -> Self {
        MonorepoConfig {
            versioning_file: None,
            path: default_version_path(),
        }
    }
}

impl MonorepoConfig {
    /// The configured glob, or a `Config` error when absent
    pub fn versioning_file(&self) -> Result<&str> {
        match self.versioning_file.as_deref() {
            Some(glob) if !glob.trim().is_empty() => Ok(glob),
            _ => Err(MonobumpError::config(
                "monorepo.versioning-file is not configured",
            )),
        }
    }
}

/// Returns the default list of commit types that trigger minor version bumps.
fn default_update_minor() -> Vec<String> {
    vec!["feat".to_string()]
}

/// Returns the default list of commit types that trigger patch version bumps.
fn default_update_patch() -> Vec<String> {
    vec![
        "fix".to_string(),
        "perf".to_string(),
        "refactor".to_string(),
        "build".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Commit classification rules.
///
/// Breaking changes always bump major; the lists map conventional commit types
/// to the bump they trigger.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct VersioningConfig {
    #[serde(default)]
    pub update_major: Vec<String>,

    #[serde(default = "default_update_minor")]
    pub update_minor: Vec<String>,

    #[serde(default = "default_update_patch")]
    pub update_patch: Vec<String>,

    /// When false, commits of unlisted types bump patch
    #[serde(default = "default_true")]
    pub ignore_unknown: bool,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            update_major: Vec::new(),
            update_minor: default_update_minor(),
            update_patch: default_update_patch(),
            ignore_unknown: true,
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Tag creation options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    #[serde(default)]
    pub push: bool,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            push: false,
            remote: default_remote(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `monobump.toml` in current directory
/// 3. `monobump.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    match locate_config(config_path) {
        Some(path) => parse_file(&path),
        None => Ok(Config::default()),
    }
}

fn locate_config(config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(PathBuf::from(path));
    }

    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

fn parse_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        MonobumpError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_str(&content)
        .map_err(|e| MonobumpError::config(format!("{}: {}", path.display(), e)))
}

/// Parse configuration from TOML text
pub fn parse_str(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}
