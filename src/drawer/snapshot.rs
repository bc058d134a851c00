use std::collections::HashMap;

use super::item::{DrawerItem, FOLDER_ID_SHIFT};
use super::nav::NavTag;
use super::tree::{DrawerTree, NodePath};

// ============================================================================
// Supporting Types
// ============================================================================

/// Aggregate counts delivered alongside the feed tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawerCounts {
    pub queue_size: u32,
    pub new_items: u32,
    pub downloaded_items: u32,
    /// Downloaded episodes that may be deleted to free cache space.
    pub reclaimable_items: u32,
}

/// What a list position shows.
#[derive(Debug, Clone, Copy)]
pub enum ItemKind<'a> {
    NavEntry(NavTag),
    Divider,
    TreeNode(&'a DrawerItem),
}

/// Indicator shown next to a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavBadge {
    None,
    Count(u64),
    /// The episode cache is at or above its limit.
    CacheFull,
}

// ============================================================================
// NavListSnapshot
// ============================================================================

/// Immutable, render-ready view of the navigation drawer.
///
/// Rows are the enabled navigation sections, then a divider if the tree is
/// non-empty, then the visible tree nodes in pre-order. A snapshot is never
/// modified after construction; a rebuild produces a new one.
#[derive(Debug, Clone)]
pub struct NavListSnapshot {
    tags: Vec<NavTag>,
    tree: DrawerTree,
    rows: Vec<NodePath>,
    counts: DrawerCounts,
    feed_counter_sum: u64,
    episode_cache_limit: Option<u32>,
    subscriptions_filtered: bool,
}

impl NavListSnapshot {
    /// Combine navigation sections and a tree into a snapshot.
    ///
    /// Tag order is kept as given. The subscription-list placeholder and
    /// repeated tags are dropped since neither occupies a row.
    pub fn build(enabled_tags: impl IntoIterator<Item = NavTag>, tree: DrawerTree) -> Self {
        let mut tags: Vec<NavTag> = Vec::new();
        for tag in enabled_tags {
            if tag != NavTag::SubscriptionList && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        warn_on_id_collisions(&tree);

        let rows = tree.visible_paths();
        let feed_counter_sum = tree.counter_sum();
        tracing::debug!(
            tags = tags.len(),
            tree_rows = rows.len(),
            "Built navigation snapshot"
        );

        Self {
            tags,
            tree,
            rows,
            counts: DrawerCounts::default(),
            feed_counter_sum,
            episode_cache_limit: None,
            subscriptions_filtered: false,
        }
    }

    pub fn with_counts(mut self, counts: DrawerCounts) -> Self {
        self.counts = counts;
        self
    }

    /// Override the counter sum shown on the Subscriptions entry.
    ///
    /// Used when the tree itself is hidden but its total is still wanted.
    pub fn with_feed_counter_sum(mut self, sum: u64) -> Self {
        self.feed_counter_sum = sum;
        self
    }

    /// Cache size limit used for the Downloads badge. `None` disables it.
    pub fn with_episode_cache_limit(mut self, limit: Option<u32>) -> Self {
        self.episode_cache_limit = limit.filter(|limit| *limit > 0);
        self
    }

    pub fn with_subscriptions_filter(mut self, filtered: bool) -> Self {
        self.subscriptions_filtered = filtered;
        self
    }

    // ========================================================================
    // Position Mapping
    // ========================================================================

    pub fn len(&self) -> usize {
        self.tree_offset() + self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_divider(&self) -> bool {
        !self.tree.is_empty()
    }

    /// Position of the first tree row.
    pub fn tree_offset(&self) -> usize {
        self.tags.len() + usize::from(self.has_divider())
    }

    /// Classify a row.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`. Positions always come from this
    /// snapshot's own length, so anything else is a caller bug.
    pub fn kind_at(&self, position: usize) -> ItemKind<'_> {
        assert!(
            position < self.len(),
            "position {position} out of range for navigation list of {} rows",
            self.len()
        );
        if position < self.tags.len() {
            ItemKind::NavEntry(self.tags[position])
        } else if position < self.tree_offset() {
            ItemKind::Divider
        } else {
            let path = &self.rows[position - self.tree_offset()];
            match self.tree.get(path) {
                Some(item) => ItemKind::TreeNode(item),
                None => unreachable!("visible path {path:?} does not resolve"),
            }
        }
    }

    /// Stable id for a row.
    ///
    /// Tree rows use the item's stable id, which is always positive. Section
    /// rows and the divider get `-(position + 1)`.
    pub fn item_id(&self, position: usize) -> i64 {
        match self.kind_at(position) {
            ItemKind::TreeNode(item) => item.stable_id(),
            ItemKind::NavEntry(_) | ItemKind::Divider => -(position as i64) - 1,
        }
    }

    pub fn counter_for(&self, item: &DrawerItem) -> u64 {
        item.counter()
    }

    pub fn badge(&self, tag: NavTag) -> NavBadge {
        let count = |n: u64| {
            if n > 0 {
                NavBadge::Count(n)
            } else {
                NavBadge::None
            }
        };
        match tag {
            NavTag::Queue => count(u64::from(self.counts.queue_size)),
            NavTag::Episodes => count(u64::from(self.counts.new_items)),
            NavTag::Subscriptions => count(self.feed_counter_sum),
            NavTag::Downloads => match self.episode_cache_limit {
                Some(limit) => {
                    let used = self
                        .counts
                        .downloaded_items
                        .saturating_sub(self.counts.reclaimable_items);
                    if used >= limit {
                        NavBadge::CacheFull
                    } else {
                        NavBadge::None
                    }
                }
                None => NavBadge::None,
            },
            NavTag::PlaybackHistory | NavTag::AddFeed | NavTag::SubscriptionList => {
                NavBadge::None
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn tags(&self) -> &[NavTag] {
        &self.tags
    }

    pub fn tree(&self) -> &DrawerTree {
        &self.tree
    }

    pub fn counts(&self) -> DrawerCounts {
        self.counts
    }

    /// Whether the divider should tell the user that feeds are filtered.
    pub fn subscriptions_filtered(&self) -> bool {
        self.subscriptions_filtered && self.has_divider()
    }
}

/// Identity of the thing an id stands for. The same feed shown in two
/// folders is one entity.
#[derive(Debug, PartialEq, Eq)]
enum Entity<'a> {
    Folder(&'a str),
    Feed(i64),
}

fn warn_on_id_collisions(tree: &DrawerTree) {
    let mut seen: HashMap<i64, Entity<'_>> = HashMap::new();
    for item in tree.iter() {
        let entity = match item {
            DrawerItem::Folder(folder) => Entity::Folder(&folder.name),
            DrawerItem::Feed(feed) => {
                if feed.id >= 1 << FOLDER_ID_SHIFT {
                    tracing::debug!(feed_id = feed.id, "Feed id overlaps folder id range");
                }
                Entity::Feed(feed.feed.id)
            }
        };
        let id = item.stable_id();
        match seen.get(&id) {
            Some(existing) if *existing != entity => {
                tracing::warn!(
                    id,
                    first = ?existing,
                    second = ?entity,
                    "Drawer item id collision"
                );
            }
            Some(_) => {}
            None => {
                seen.insert(id, entity);
            }
        }
    }
}
