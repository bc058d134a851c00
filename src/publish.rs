//! Building and publishing drawer snapshots.
//!
//! The current snapshot lives in a `watch` channel as an `Arc`. Publishing
//! swaps the whole `Arc`, so a renderer reading on another task sees either
//! the old snapshot or the new one, never a half-built tree. Old snapshots
//! stay valid for as long as someone holds them.
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::drawer::{DrawerTree, NavListSnapshot, NavSection};
use crate::library::{DrawerDataSource, NavDrawerData};
use crate::preferences::Preferences;

/// Build a snapshot from preferences and freshly loaded data.
pub fn rebuild_snapshot(prefs: &Preferences, data: NavDrawerData) -> NavListSnapshot {
    let section = NavSection::resolve(&prefs.hidden_drawer_items);
    let feed_counter_sum = data.tree.counter_sum();
    let tree = if section.show_subscription_list {
        data.tree
    } else {
        DrawerTree::default()
    };

    NavListSnapshot::build(section.tags, tree)
        .with_counts(data.counts)
        .with_feed_counter_sum(feed_counter_sum)
        .with_episode_cache_limit(prefs.episode_cache_limit())
        .with_subscriptions_filter(prefs.subscriptions_filter_enabled)
}

// ============================================================================
// SnapshotPublisher
// ============================================================================

/// Single publish point for the current snapshot.
#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: Arc<watch::Sender<Arc<NavListSnapshot>>>,
}

impl SnapshotPublisher {
    pub fn new(initial: NavListSnapshot) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current snapshot and wake subscribers.
    pub fn publish(&self, snapshot: NavListSnapshot) {
        let rows = snapshot.len();
        self.tx.send_replace(Arc::new(snapshot));
        tracing::debug!(rows, "Published navigation snapshot");
    }

    pub fn current(&self) -> Arc<NavListSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<NavListSnapshot>> {
        self.tx.subscribe()
    }
}

// ============================================================================
// Reload Loop
// ============================================================================

/// Triggers for the reload loop besides preference changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// Feed, queue or download data changed upstream.
    LibraryChanged,
    Shutdown,
}

/// Rebuild and publish a snapshot whenever preferences or library data
/// change.
///
/// Loading runs on a blocking thread. A failed load keeps the previous
/// snapshot. Returns on [`ReloadEvent::Shutdown`] or once either channel is
/// closed.
pub async fn run_reload_loop(
    source: Arc<dyn DrawerDataSource>,
    mut prefs_rx: watch::Receiver<Preferences>,
    mut events: mpsc::Receiver<ReloadEvent>,
    publisher: SnapshotPublisher,
) {
    loop {
        let reason = tokio::select! {
            changed = prefs_rx.changed() => {
                if changed.is_err() {
                    tracing::debug!("Preference store dropped, stopping reload loop");
                    break;
                }
                "preferences"
            }
            event = events.recv() => match event {
                Some(ReloadEvent::LibraryChanged) => "library",
                Some(ReloadEvent::Shutdown) | None => {
                    tracing::debug!("Reload loop shutting down");
                    break;
                }
            },
        };

        let prefs = prefs_rx.borrow_and_update().clone();
        let loader = Arc::clone(&source);
        let load_prefs = prefs.clone();
        let loaded = tokio::task::spawn_blocking(move || loader.load(&load_prefs)).await;

        match loaded {
            Ok(Ok(data)) => {
                tracing::debug!(reason, "Rebuilding navigation snapshot");
                publisher.publish(rebuild_snapshot(&prefs, data));
            }
            Ok(Err(e)) => {
                tracing::warn!(reason, error = %e, "Failed to load drawer data, keeping previous snapshot");
            }
            Err(e) => {
                tracing::warn!(reason, error = %e, "Drawer data load task failed");
            }
        }
    }
}
