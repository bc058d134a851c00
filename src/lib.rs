//! Podcast navigation drawer model.
//!
//! - [`drawer`]: drawer items, the folder/feed tree and flattened snapshots
//! - [`chapter`]: embedded chapter-image locators
//! - [`library`]: drawer data sources
//! - [`preferences`] / [`config`]: user settings
//! - [`publish`]: snapshot publishing and the reload loop
//! - [`ui`]: terminal rendering

pub mod chapter;
pub mod config;
pub mod drawer;
pub mod library;
pub mod preferences;
pub mod publish;
pub mod ui;
pub mod util;

pub use chapter::{resolve_chapter_artwork, ChapterArtwork, EmbeddedChapterImage, NotEmbeddedError};
pub use drawer::{DrawerItem, DrawerTree, ItemKind, NavListSnapshot, NavTag};
pub use publish::{rebuild_snapshot, SnapshotPublisher};
