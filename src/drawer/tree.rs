use std::collections::HashSet;

use super::item::DrawerItem;

/// Index path from a root to a node: `[root_index, child_index, ...]`.
pub type NodePath = Box<[usize]>;

/// The feed/folder hierarchy shown below the navigation sections.
///
/// Construction assigns layers to every node, after which the tree is never
/// mutated. A changed library produces a new tree.
#[derive(Debug, Clone, Default)]
pub struct DrawerTree {
    roots: Vec<DrawerItem>,
}

impl DrawerTree {
    pub fn new(mut roots: Vec<DrawerItem>) -> Self {
        for root in &mut roots {
            root.assign_layer(0);
        }
        Self { roots }
    }

    pub fn roots(&self) -> &[DrawerItem] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Sum of feed counters, each feed counted once even when it is listed
    /// under several folders.
    pub fn counter_sum(&self) -> u64 {
        let mut seen = HashSet::new();
        self.iter()
            .filter_map(|item| match item {
                DrawerItem::Feed(feed) if seen.insert(feed.feed.id) => {
                    Some(u64::from(feed.counter))
                }
                _ => None,
            })
            .sum()
    }

    /// Resolve a path produced by [`visible_paths`](Self::visible_paths).
    pub fn get(&self, path: &[usize]) -> Option<&DrawerItem> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    /// Pre-order paths of every row the drawer shows.
    ///
    /// Children of a closed folder are skipped; with every folder open this
    /// is the full pre-order of the tree.
    pub fn visible_paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        for (index, root) in self.roots.iter().enumerate() {
            prefix.push(index);
            collect_visible(root, &mut prefix, &mut paths);
            prefix.pop();
        }
        paths
    }

    /// Full pre-order traversal, ignoring open/closed state.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }
}

fn collect_visible(item: &DrawerItem, prefix: &mut Vec<usize>, paths: &mut Vec<NodePath>) {
    paths.push(prefix.clone().into_boxed_slice());
    if let DrawerItem::Folder(folder) = item {
        if folder.is_open {
            for (index, child) in folder.children.iter().enumerate() {
                prefix.push(index);
                collect_visible(child, prefix, paths);
                prefix.pop();
            }
        }
    }
}

/// Pre-order iterator over all nodes of a [`DrawerTree`].
pub struct Iter<'a> {
    stack: Vec<&'a DrawerItem>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a DrawerItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        self.stack.extend(item.children().iter().rev());
        Some(item)
    }
}
