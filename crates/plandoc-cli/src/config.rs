//! Configuration file management for plandoc.
//!
//! Provides a TOML config file at `~/.config/plandoc/config.toml` and a
//! resolution chain for the document path: CLI flag > env var > config file >
//! default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var naming the plan document.
pub const FILE_ENV: &str = "PLANDOC_FILE";

/// Document used when nothing else names one.
pub const DEFAULT_DOCUMENT: &str = "PLAN.md";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub document: DocumentSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DocumentSection {
    /// Path of the plan document, relative to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the plandoc config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/plandoc` or `~/.config/plandoc`,
/// never the platform-specific `dirs::config_dir()`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("plandoc");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("plandoc")
}

/// Return the path to the plandoc config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Load the config file, or `None` when there is none.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    load_config_from(&path).map(Some)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PlandocConfig {
    pub document: PathBuf,
}

impl PlandocConfig {
    /// Resolve the document path: `cli_file` > `PLANDOC_FILE` env >
    /// `document.path` in the config file > `PLAN.md`.
    ///
    /// A config file that exists but does not parse is an error; a missing
    /// one is not.
    pub fn resolve(cli_file: Option<&Path>) -> Result<Self> {
        let document = if let Some(path) = cli_file {
            path.to_path_buf()
        } else if let Some(path) = std::env::var_os(FILE_ENV).filter(|v| !v.is_empty()) {
            PathBuf::from(path)
        } else if let Some(path) = load_config()?.and_then(|cfg| cfg.document.path) {
            path
        } else {
            PathBuf::from(DEFAULT_DOCUMENT)
        };
        tracing::debug!(document = %document.display(), "resolved plan document");
        Ok(Self { document })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
