//! Drawer preferences: config.toml defaults merged with stored overrides.
//!
//! Config values serve as defaults; values in the overrides file (`prefs.toml`)
//! win over them. Writes always go to the overrides file, never to the config
//! file. Subscribers are notified through a `watch` channel whenever a value
//! actually changes.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::drawer::NavTag;
use crate::util::atomic_write;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in preferences file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ============================================================================
// Preferences
// ============================================================================

/// User settings that shape the drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Hidden sections, kept in default drawer order.
    pub hidden_drawer_items: Vec<NavTag>,
    pub open_folders: BTreeSet<String>,
    /// Episode cache size in episodes. 0 = unlimited.
    pub episode_cache_size: u32,
    pub enable_autodownload: bool,
    pub subscriptions_filter_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            hidden_drawer_items: Vec::new(),
            open_folders: BTreeSet::new(),
            episode_cache_size: 20,
            enable_autodownload: false,
            subscriptions_filter_enabled: false,
        }
    }
}

impl Preferences {
    pub fn is_hidden(&self, tag: NavTag) -> bool {
        self.hidden_drawer_items.contains(&tag)
    }

    /// Cache limit the Downloads badge checks against, if any.
    pub fn episode_cache_limit(&self) -> Option<u32> {
        (self.enable_autodownload && self.episode_cache_size > 0).then_some(self.episode_cache_size)
    }

    fn normalized(mut self) -> Self {
        self.hidden_drawer_items = normalize_hidden(&self.hidden_drawer_items);
        self
    }
}

fn normalize_hidden(hidden: &[NavTag]) -> Vec<NavTag> {
    NavTag::ALL
        .into_iter()
        .filter(|tag| hidden.contains(tag))
        .collect()
}

/// Stored overrides. Absent fields fall back to config defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    hidden_drawer_items: Option<Vec<NavTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_folders: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    episode_cache_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_autodownload: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscriptions_filter_enabled: Option<bool>,
}

impl Overrides {
    fn apply(self, prefs: &mut Preferences) {
        if let Some(hidden) = self.hidden_drawer_items {
            prefs.hidden_drawer_items = hidden;
        }
        if let Some(open) = self.open_folders {
            prefs.open_folders = open;
        }
        if let Some(size) = self.episode_cache_size {
            prefs.episode_cache_size = size;
        }
        if let Some(enabled) = self.enable_autodownload {
            prefs.enable_autodownload = enabled;
        }
        if let Some(enabled) = self.subscriptions_filter_enabled {
            prefs.subscriptions_filter_enabled = enabled;
        }
    }

    fn diff(defaults: &Preferences, current: &Preferences) -> Self {
        fn changed<T: PartialEq + Clone>(default: &T, current: &T) -> Option<T> {
            (default != current).then(|| current.clone())
        }
        Self {
            hidden_drawer_items: changed(
                &defaults.hidden_drawer_items,
                &current.hidden_drawer_items,
            ),
            open_folders: changed(&defaults.open_folders, &current.open_folders),
            episode_cache_size: changed(&defaults.episode_cache_size, &current.episode_cache_size),
            enable_autodownload: changed(
                &defaults.enable_autodownload,
                &current.enable_autodownload,
            ),
            subscriptions_filter_enabled: changed(
                &defaults.subscriptions_filter_enabled,
                &current.subscriptions_filter_enabled,
            ),
        }
    }
}

// ============================================================================
// PreferenceStore
// ============================================================================

/// Live preference values with change notification.
pub struct PreferenceStore {
    defaults: Preferences,
    tx: watch::Sender<Preferences>,
    path: Option<PathBuf>,
}

impl PreferenceStore {
    /// In-memory store; `save` is a no-op.
    pub fn new(defaults: Preferences) -> Self {
        let defaults = defaults.normalized();
        let (tx, _) = watch::channel(defaults.clone());
        Self {
            defaults,
            tx,
            path: None,
        }
    }

    /// Load overrides from `path` on top of `defaults`. A missing file means
    /// no overrides.
    pub fn load(defaults: Preferences, path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let defaults = defaults.normalized();
        let mut prefs = defaults.clone();

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let overrides: Overrides = toml::from_str(&content)?;
                overrides.apply(&mut prefs);
                tracing::debug!(path = %path.display(), "Loaded preference overrides");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No preference overrides, using defaults");
            }
            Err(e) => return Err(PreferenceError::Read { path, source: e }),
        }

        let (tx, _) = watch::channel(prefs.normalized());
        Ok(Self {
            defaults,
            tx,
            path: Some(path),
        })
    }

    pub fn current(&self) -> Preferences {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply `modify` and notify subscribers if anything changed.
    fn update(&self, modify: impl FnOnce(&mut Preferences)) -> bool {
        self.tx.send_if_modified(|prefs| {
            let before = prefs.clone();
            modify(prefs);
            prefs.hidden_drawer_items = normalize_hidden(&prefs.hidden_drawer_items);
            *prefs != before
        })
    }

    // ========================================================================
    // Setters
    // ========================================================================

    pub fn set_hidden_drawer_items(&self, hidden: &[NavTag]) -> bool {
        let changed = self.update(|prefs| prefs.hidden_drawer_items = hidden.to_vec());
        if changed {
            tracing::info!(hidden = ?self.current().hidden_drawer_items, "Hidden drawer items changed");
        }
        changed
    }

    pub fn hide(&self, tags: &[NavTag]) -> bool {
        let mut hidden = self.current().hidden_drawer_items;
        hidden.extend_from_slice(tags);
        self.set_hidden_drawer_items(&hidden)
    }

    pub fn show(&self, tags: &[NavTag]) -> bool {
        let mut hidden = self.current().hidden_drawer_items;
        hidden.retain(|tag| !tags.contains(tag));
        self.set_hidden_drawer_items(&hidden)
    }

    pub fn set_folder_open(&self, name: &str, open: bool) -> bool {
        self.update(|prefs| {
            if open {
                prefs.open_folders.insert(name.to_string());
            } else {
                prefs.open_folders.remove(name);
            }
        })
    }

    pub fn set_episode_cache_size(&self, size: u32) -> bool {
        self.update(|prefs| prefs.episode_cache_size = size)
    }

    pub fn set_enable_autodownload(&self, enabled: bool) -> bool {
        self.update(|prefs| prefs.enable_autodownload = enabled)
    }

    pub fn set_subscriptions_filter(&self, enabled: bool) -> bool {
        self.update(|prefs| prefs.subscriptions_filter_enabled = enabled)
    }

    /// Persist values that differ from the defaults.
    pub fn save(&self) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let overrides = Overrides::diff(&self.defaults, &self.current());
        let content = toml::to_string(&overrides)?;
        atomic_write(path, content.as_bytes()).map_err(|e| PreferenceError::Write {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "Saved preference overrides");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
