use std::sync::Arc;

use sha2::{Digest, Sha256};

// ============================================================================
// Identifiers
// ============================================================================

/// Number of low bits left free below every folder id.
///
/// Feed ids are allocated by the feed store and stay small, so shifting the
/// folder name hash past them keeps the two id spaces apart as long as no
/// feed id reaches `1 << FOLDER_ID_SHIFT`.
pub const FOLDER_ID_SHIFT: u32 = 20;

/// Derive the stable id of a folder from its name.
///
/// Uses the first four bytes of the SHA-256 digest so the value is the same
/// across runs, platforms and toolchain versions. The `+ 1` keeps the id
/// strictly positive even for a zero hash. The result lies in
/// `[1 << 20, 1 << 52]`.
pub fn folder_id(name: &str) -> i64 {
    let digest = Sha256::digest(name.as_bytes());
    let hash = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    ((u64::from(hash) + 1) << FOLDER_ID_SHIFT) as i64
}

// ============================================================================
// Feed Entity
// ============================================================================

/// A subscribed feed as handed over by the feed store.
///
/// The drawer never mutates feeds; items share them through `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    /// Whether the most recent refresh of this feed failed.
    pub last_update_failed: bool,
}

impl Feed {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: None,
            last_update_failed: false,
        }
    }
}

// ============================================================================
// Drawer Items
// ============================================================================

/// A node of the navigation tree.
#[derive(Debug, Clone)]
pub enum DrawerItem {
    Folder(FolderItem),
    Feed(FeedItem),
}

#[derive(Debug, Clone)]
pub struct FolderItem {
    pub name: String,
    pub children: Vec<DrawerItem>,
    pub is_open: bool,
    id: i64,
    layer: u32,
}

#[derive(Debug, Clone)]
pub struct FeedItem {
    pub feed: Arc<Feed>,
    pub id: i64,
    pub counter: u32,
    layer: u32,
}

impl DrawerItem {
    /// Create a folder. Its layer is assigned once the item lands in a
    /// [`DrawerTree`](super::DrawerTree).
    pub fn folder(name: impl Into<String>, children: Vec<DrawerItem>, is_open: bool) -> Self {
        let name = name.into();
        DrawerItem::Folder(FolderItem {
            id: folder_id(&name),
            name,
            children,
            is_open,
            layer: 0,
        })
    }

    /// Create a feed entry carrying the feed's own id.
    ///
    /// `feed.id` must be positive. Non-tree rows use negative ids, so a
    /// feed id of zero or below could be confused with them.
    pub fn feed(feed: Arc<Feed>, counter: u32) -> Self {
        debug_assert!(feed.id > 0, "feed id must be positive, got {}", feed.id);
        DrawerItem::Feed(FeedItem {
            id: feed.id,
            feed,
            counter,
            layer: 0,
        })
    }

    pub fn stable_id(&self) -> i64 {
        match self {
            DrawerItem::Folder(folder) => folder.id,
            DrawerItem::Feed(feed) => feed.id,
        }
    }

    /// Nesting depth: 0 for roots, parent + 1 for everything else.
    pub fn layer(&self) -> u32 {
        match self {
            DrawerItem::Folder(folder) => folder.layer,
            DrawerItem::Feed(feed) => feed.layer,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DrawerItem::Folder(folder) => &folder.name,
            DrawerItem::Feed(feed) => &feed.feed.title,
        }
    }

    /// Counter shown next to the item.
    ///
    /// Folders sum their subtree on every call; nothing is cached.
    pub fn counter(&self) -> u64 {
        match self {
            DrawerItem::Feed(feed) => u64::from(feed.counter),
            DrawerItem::Folder(folder) => folder.children.iter().map(DrawerItem::counter).sum(),
        }
    }

    pub fn children(&self) -> &[DrawerItem] {
        match self {
            DrawerItem::Folder(folder) => &folder.children,
            DrawerItem::Feed(_) => &[],
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, DrawerItem::Folder(_))
    }

    pub(super) fn assign_layer(&mut self, layer: u32) {
        match self {
            DrawerItem::Feed(feed) => feed.layer = layer,
            DrawerItem::Folder(folder) => {
                folder.layer = layer;
                for child in &mut folder.children {
                    child.assign_layer(layer + 1);
                }
            }
        }
    }
}
