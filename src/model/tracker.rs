//! Selection, dirty and expansion state
//!
//! Everything here is keyed by `NodePath`, never by node identity, so a
//! consumer can hold paths across tree operations and diff on them.

use crate::error::{ExplorerError, Result};
use crate::view::file_tree::{FileTree, NodeId, NodePath, TreeNode};
use std::collections::HashMap;

/// The currently open file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: NodeId,
    pub path: NodePath,
}

/// Tracks the selected file, unsaved edits and which directories are open
#[derive(Debug, Default)]
pub struct SelectionTracker {
    selected: Option<Selection>,
    dirty: HashMap<NodePath, bool>,
    expanded: HashMap<NodePath, bool>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `node` the selected file
    ///
    /// Does not save or discard edits of the previous selection.
    pub fn select(&mut self, node: &TreeNode) -> Result<()> {
        if !node.is_file() {
            return Err(ExplorerError::NotAFile(node.path.to_string()));
        }
        tracing::debug!("Selected {}", node.path);
        self.selected = Some(Selection {
            id: node.id,
            path: node.path.clone(),
        });
        Ok(())
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn mark_dirty(&mut self, key: &NodePath) {
        self.dirty.insert(key.clone(), true);
    }

    /// Only call after a confirmed successful write
    pub fn clear_dirty(&mut self, key: &NodePath) {
        self.dirty.insert(key.clone(), false);
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty.get(key).copied().unwrap_or(false)
    }

    /// Paths with unsaved edits, in no particular order
    pub fn dirty_paths(&self) -> impl Iterator<Item = &NodePath> {
        self.dirty
            .iter()
            .filter(|(_, dirty)| **dirty)
            .map(|(path, _)| path)
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.get(path).copied().unwrap_or(false)
    }

    /// Flip a directory open or closed and return the new state
    ///
    /// Opening loads the directory first, so an expanded path always has
    /// loaded children. If loading fails the path stays closed.
    pub async fn toggle_expansion(&mut self, tree: &mut FileTree, path: &str) -> Result<bool> {
        let node = tree
            .get_node_by_path(path)
            .ok_or_else(|| ExplorerError::NodeNotFound(path.to_string()))?;
        if !node.is_dir() {
            return Err(ExplorerError::NotADirectory(path.to_string()));
        }
        let (id, key) = (node.id, node.path.clone());

        if self.is_expanded(path) {
            self.expanded.insert(key, false);
            return Ok(false);
        }

        tree.expand_node(id).await?;
        tracing::debug!("Expanded {}", key);
        self.expanded.insert(key, true);
        Ok(true)
    }

    /// Load and open every directory above `path` so it becomes visible
    pub async fn reveal(&mut self, tree: &mut FileTree, path: &str) -> Result<NodeId> {
        let id = tree.load_path(path).await?;
        let root_id = tree.root_id();

        for ancestor in tree.get_ancestors(id) {
            if ancestor == id || ancestor == root_id {
                continue;
            }
            if let Some(node) = tree.get_node(ancestor) {
                self.expanded.insert(node.path.clone(), true);
            }
        }
        Ok(id)
    }

    /// Forget everything; used when a new folder replaces the tree
    pub fn reset(&mut self) {
        self.selected = None;
        self.dirty.clear();
        self.expanded.clear();
    }
}
