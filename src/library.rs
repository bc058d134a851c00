//! Feed/folder data feeding the drawer.
//!
//! The feed store, queue and download manager live elsewhere; what reaches
//! the drawer is a list of feeds with their tags and counters plus a few
//! aggregate counts. [`DrawerDataSource`] is that upstream query, and
//! [`LibraryFile`] reads it from a TOML export.
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drawer::{DrawerCounts, DrawerItem, DrawerTree, Feed};
use crate::preferences::Preferences;

/// Tag that places a feed at the top level instead of inside a folder.
pub const ROOT_TAG: &str = "#root";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read library file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in library file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid feed '{title}': id must be positive, got {id}")]
    InvalidFeed { id: i64, title: String },
}

// ============================================================================
// Data Types
// ============================================================================

/// Everything the drawer needs for one rebuild.
#[derive(Debug, Clone, Default)]
pub struct NavDrawerData {
    pub tree: DrawerTree,
    pub counts: DrawerCounts,
}

/// Upstream query for drawer data.
pub trait DrawerDataSource: Send + Sync {
    fn load(&self, prefs: &Preferences) -> Result<NavDrawerData, LibraryError>;
}

/// A feed as exported by the feed store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFeed {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub last_update_failed: bool,
    /// Unread/new counter shown in the drawer.
    #[serde(default)]
    pub counter: u32,
    /// Folder names; empty or [`ROOT_TAG`] means top level.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Exported library: feeds plus aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    pub queue_size: u32,
    pub new_items: u32,
    pub downloaded_items: u32,
    pub reclaimable_items: u32,
    pub feeds: Vec<LibraryFeed>,
}

impl Library {
    pub fn parse(content: &str) -> Result<Self, LibraryError> {
        let library: Library = toml::from_str(content)?;
        if let Some(feed) = library.feeds.iter().find(|feed| feed.id <= 0) {
            return Err(LibraryError::InvalidFeed {
                id: feed.id,
                title: feed.title.clone(),
            });
        }
        Ok(library)
    }

    pub fn counts(&self) -> DrawerCounts {
        DrawerCounts {
            queue_size: self.queue_size,
            new_items: self.new_items,
            downloaded_items: self.downloaded_items,
            reclaimable_items: self.reclaimable_items,
        }
    }

    /// Group feeds into the drawer tree.
    ///
    /// Feeds are ordered by title, case-insensitively. Each tag other than
    /// [`ROOT_TAG`] becomes a folder, and a feed with several tags shows up in
    /// each of them once; repeated tags are ignored. Folders come first, ordered by name, followed by the
    /// top-level feeds. A folder is open iff its name is in `open_folders`.
    pub fn drawer_data(&self, open_folders: &BTreeSet<String>) -> NavDrawerData {
        let mut feeds: Vec<&LibraryFeed> = self.feeds.iter().collect();
        feeds.sort_by_cached_key(|feed| feed.title.to_lowercase());

        let mut folders: BTreeMap<(String, String), Vec<DrawerItem>> = BTreeMap::new();
        let mut roots = Vec::new();

        for entry in feeds {
            let feed = Arc::new(Feed {
                id: entry.id,
                title: entry.title.clone(),
                image_url: entry.image_url.clone(),
                last_update_failed: entry.last_update_failed,
            });

            let tags: BTreeSet<&str> = entry.tags.iter().map(String::as_str).collect();
            let mut at_root = tags.is_empty();
            for tag in tags {
                if tag == ROOT_TAG {
                    at_root = true;
                } else {
                    folders
                        .entry((tag.to_lowercase(), tag.to_string()))
                        .or_default()
                        .push(DrawerItem::feed(Arc::clone(&feed), entry.counter));
                }
            }
            if at_root {
                roots.push(DrawerItem::feed(feed, entry.counter));
            }
        }

        let mut items: Vec<DrawerItem> = folders
            .into_iter()
            .map(|((_, name), children)| {
                let is_open = open_folders.contains(&name);
                DrawerItem::folder(name, children, is_open)
            })
            .collect();
        items.extend(roots);

        NavDrawerData {
            tree: DrawerTree::new(items),
            counts: self.counts(),
        }
    }
}

impl DrawerDataSource for Library {
    fn load(&self, prefs: &Preferences) -> Result<NavDrawerData, LibraryError> {
        Ok(self.drawer_data(&prefs.open_folders))
    }
}

// ============================================================================
// LibraryFile
// ============================================================================

/// Library export on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct LibraryFile {
    path: PathBuf,
}

impl LibraryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Library, LibraryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LibraryError::NotFound(self.path.clone()));
            }
            Err(e) => {
                return Err(LibraryError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let library = Library::parse(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            feeds = library.feeds.len(),
            "Loaded library export"
        );
        Ok(library)
    }
}

impl DrawerDataSource for LibraryFile {
    fn load(&self, prefs: &Preferences) -> Result<NavDrawerData, LibraryError> {
        Ok(self.read()?.drawer_data(&prefs.open_folders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn library_feed(id: i64, title: &str, counter: u32, tags: &[&str]) -> LibraryFeed {
        LibraryFeed {
            id,
            title: title.to_string(),
            image_url: None,
            last_update_failed: false,
            counter,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn outline(tree: &DrawerTree) -> Vec<String> {
        tree.iter()
            .map(|item| format!("{}{}", "  ".repeat(item.layer() as usize), item.title()))
            .collect()
    }

    #[test]
    fn test_drawer_data_groups_by_tag() {
        let library = Library {
            feeds: vec![
                library_feed(1, "zeta", 1, &[]),
                library_feed(2, "Alpha", 2, &["Tech"]),
                library_feed(3, "beta", 3, &["news", "Tech"]),
                library_feed(4, "Gamma", 4, &[ROOT_TAG, "news"]),
            ],
            ..Library::default()
        };

        let data = library.drawer_data(&BTreeSet::new());
        assert_eq!(
            outline(&data.tree),
            vec![
                "news",
                "  beta",
                "  Gamma",
                "Tech",
                "  Alpha",
                "  beta",
                "Gamma",
                "zeta",
            ]
        );
        let counters: Vec<u64> = data.tree.roots().iter().map(DrawerItem::counter).collect();
        assert_eq!(counters, vec![7, 5, 4, 1]);
    }

    #[test]
    fn test_drawer_data_repeated_tag_lists_feed_once() {
        let library = Library {
            feeds: vec![library_feed(1, "Alpha", 3, &["Tech", "Tech", ROOT_TAG, ROOT_TAG])],
            ..Library::default()
        };

        let data = library.drawer_data(&BTreeSet::new());
        assert_eq!(outline(&data.tree), vec!["Tech", "  Alpha", "Alpha"]);
        let folder = &data.tree.roots()[0];
        assert_eq!(folder.children().len(), 1);
        assert_eq!(folder.counter(), 3);
        assert_eq!(data.tree.counter_sum(), 3);
    }

    #[test]
    fn test_drawer_data_open_folders() {
        let library = Library {
            feeds: vec![
                library_feed(1, "One", 1, &["Open"]),
                library_feed(2, "Two", 1, &["Closed"]),
            ],
            ..Library::default()
        };
        let open: BTreeSet<String> = ["Open".to_string()].into_iter().collect();
        let data = library.drawer_data(&open);

        let states: Vec<(String, bool)> = data
            .tree
            .roots()
            .iter()
            .map(|item| match item {
                DrawerItem::Folder(folder) => (folder.name.clone(), folder.is_open),
                DrawerItem::Feed(_) => panic!("expected folders only"),
            })
            .collect();
        assert_eq!(
            states,
            vec![("Closed".to_string(), false), ("Open".to_string(), true)]
        );
    }

    #[test]
    fn test_parse_library() {
        let content = r#"
queue_size = 3
new_items = 12
downloaded_items = 40
reclaimable_items = 5

[[feeds]]
id = 1
title = "Rust Radio"
counter = 4
tags = ["Tech"]

[[feeds]]
id = 2
title = "Daily News"
image_url = "https://example.com/news.png"
last_update_failed = true
"#;
        let library = Library::parse(content).unwrap();
        assert_eq!(
            library.counts(),
            DrawerCounts {
                queue_size: 3,
                new_items: 12,
                downloaded_items: 40,
                reclaimable_items: 5,
            }
        );
        assert_eq!(library.feeds.len(), 2);
        assert!(library.feeds[1].last_update_failed);
        assert!(library.feeds[1].tags.is_empty());
        assert_eq!(library.feeds[1].counter, 0);
    }

    #[test]
    fn test_parse_rejects_non_positive_id() {
        let content = "[[feeds]]\nid = 0\ntitle = \"Broken\"\n";
        let err = Library::parse(content).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidFeed { id: 0, .. }));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = Library::parse("feeds = [").unwrap_err();
        assert!(matches!(err, LibraryError::Parse(_)));
    }

    #[test]
    fn test_library_file_missing() {
        let file = LibraryFile::new("/tmp/podnav_test_missing_library.toml");
        let err = file.load(&Preferences::default()).unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
    }

    #[test]
    fn test_library_file_load() {
        let dir = std::env::temp_dir().join("podnav_library_test_load");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("library.toml");
        std::fs::write(
            &path,
            "queue_size = 2\n[[feeds]]\nid = 7\ntitle = \"Solo\"\ncounter = 9\n",
        )
        .unwrap();

        let data = LibraryFile::new(&path)
            .load(&Preferences::default())
            .unwrap();
        assert_eq!(data.counts.queue_size, 2);
        assert_eq!(data.tree.roots().len(), 1);
        assert_eq!(data.tree.roots()[0].stable_id(), 7);
        assert_eq!(data.tree.counter_sum(), 9);

        std::fs::remove_dir_all(&dir).ok();
    }
}
