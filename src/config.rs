//! Configuration file parser for ~/.config/podnav/config.toml.
//!
//! The config file is optional and only supplies drawer defaults; values the
//! CLI changes are stored separately as preference overrides. Unknown keys
//! are logged as likely typos rather than rejected.
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::drawer::NavTag;
use crate::preferences::Preferences;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`. The drawer fields are the
/// defaults for [`Preferences`]; stored overrides take precedence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the library export. Defaults to `library.toml` next to the config.
    pub library: Option<PathBuf>,

    /// Navigation sections hidden from the drawer.
    pub hidden_drawer_items: Vec<NavTag>,

    /// Folders shown expanded.
    pub open_folders: Vec<String>,

    /// Episode cache size in episodes. 0 = unlimited.
    pub episode_cache_size: u32,

    /// Whether episodes are downloaded automatically.
    pub enable_autodownload: bool,

    /// Whether the subscription list is filtered.
    pub subscriptions_filter: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: None,
            hidden_drawer_items: Vec::new(),
            open_folders: Vec::new(),
            episode_cache_size: 20,
            enable_autodownload: false,
            subscriptions_filter: false,
        }
    }
}

/// Keys `Config` understands; anything else is reported as a likely typo.
const KNOWN_KEYS: &[&str] = &[
    "library",
    "hidden_drawer_items",
    "open_folders",
    "episode_cache_size",
    "enable_autodownload",
    "subscriptions_filter",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// A missing or blank file gives `Config::default()`. Unknown keys are
    /// accepted and logged; an unknown navigation section name is a parse
    /// error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = Self::read_source(path)? else {
            return Ok(Self::default());
        };
        warn_unknown_keys(&content);

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            hidden = config.hidden_drawer_items.len(),
            open_folders = config.open_folders.len(),
            "Loaded drawer configuration"
        );
        Ok(config)
    }

    /// Config text, or `None` when there is nothing to parse.
    ///
    /// Reads at most one byte past the limit, so an oversized file is
    /// rejected without loading it whole.
    fn read_source(path: &Path) -> Result<Option<String>, ConfigError> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let mut content = String::new();
        file.take(Self::MAX_FILE_SIZE + 1)
            .read_to_string(&mut content)?;
        if content.len() as u64 > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} exceeds {} bytes",
                path.display(),
                Self::MAX_FILE_SIZE
            )));
        }

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is blank, using defaults");
            return Ok(None);
        }
        Ok(Some(content))
    }

    /// Drawer preferences with config values as defaults.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            hidden_drawer_items: self.hidden_drawer_items.clone(),
            open_folders: self.open_folders.iter().cloned().collect(),
            episode_cache_size: self.episode_cache_size,
            enable_autodownload: self.enable_autodownload,
            subscriptions_filter_enabled: self.subscriptions_filter,
        }
    }
}

fn warn_unknown_keys(content: &str) {
    // Syntax errors are reported by the typed parse
    let Ok(raw) = content.parse::<toml::Table>() else {
        return;
    };
    for key in raw.keys().filter(|key| !KNOWN_KEYS.contains(&key.as_str())) {
        tracing::warn!(key = %key, "Unknown key in config file, ignoring");
    }
}

// ============================================================================
// Tests
// ============================================================================
