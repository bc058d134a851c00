//! Navigation drawer model.
//!
//! - `item` - the `DrawerItem` sum type and stable folder ids
//! - `tree` - layered feed/folder tree with pre-order traversal
//! - `nav` - fixed navigation sections and the user's hidden set
//! - `snapshot` - the immutable row model consumed by the renderer

mod item;
mod nav;
mod snapshot;
mod tree;

pub use item::{folder_id, DrawerItem, Feed, FeedItem, FolderItem, FOLDER_ID_SHIFT};
pub use nav::{NavSection, NavTag, UnknownNavTag};
pub use snapshot::{DrawerCounts, ItemKind, NavBadge, NavListSnapshot};
pub use tree::{DrawerTree, Iter, NodePath};
