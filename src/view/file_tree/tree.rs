use super::node::{NodeId, NodePath, TreeNode, PATH_SEPARATOR};
use crate::error::{ExplorerError, Result};
use crate::services::fs::{EntryHandle, FsEntry, FsManager};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

/// Entries whose name starts with this marker never enter the tree
pub const HIDDEN_PREFIX: char = '.';

pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

/// Order of siblings within a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Case-sensitive byte order of names
    #[default]
    Name,
    /// Directories first, then case-insensitive name
    DirectoriesFirst,
    /// Whatever order the storage layer returned
    Storage,
}

impl SortOrder {
    fn apply(self, entries: &mut [FsEntry]) {
        match self {
            SortOrder::Name => entries.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::DirectoriesFirst => {
                entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
                    (true, false) => std::cmp::Ordering::Less,
                    (false, true) => std::cmp::Ordering::Greater,
                    _ => a
                        .name
                        .to_lowercase()
                        .cmp(&b.name.to_lowercase())
                        .then_with(|| a.name.cmp(&b.name)),
                })
            }
            SortOrder::Storage => {}
        }
    }
}

/// Enumerate `dir` and prepare its visible children
///
/// Hidden entries are dropped, the rest are ordered by `sort_order` and
/// given `parent_path/name` paths. Nothing in the tree is touched.
pub async fn build_children(
    fs_manager: &FsManager,
    dir: &EntryHandle,
    parent_path: &NodePath,
    sort_order: SortOrder,
) -> io::Result<Vec<(NodePath, FsEntry)>> {
    let mut entries: Vec<FsEntry> = fs_manager
        .list_dir(dir)
        .await?
        .into_iter()
        .filter(|entry| {
            if entry.name.is_empty() || entry.name.contains(PATH_SEPARATOR) {
                tracing::warn!("Ignoring entry with unusable name {:?} in {}", entry.name, dir);
                return false;
            }
            !is_hidden(&entry.name)
        })
        .collect();

    sort_order.apply(&mut entries);

    Ok(entries
        .into_iter()
        .map(|entry| (parent_path.join(&entry.name), entry))
        .collect())
}

/// Directory tree with lazy loading
///
/// The tree is an arena of nodes addressed by `NodeId`, with a path index on
/// the side. Directories are only enumerated when expanded, and each at most
/// once: a loaded directory keeps its children for the lifetime of the tree.
/// Switching folders builds a new tree rather than mutating this one.
#[derive(Debug)]
pub struct FileTree {
    /// All nodes indexed by ID
    nodes: HashMap<NodeId, TreeNode>,
    /// Path to node ID mapping for identity lookups
    path_to_node: HashMap<NodePath, NodeId>,
    root_id: NodeId,
    next_id: usize,
    fs_manager: Arc<FsManager>,
    sort_order: SortOrder,
}

impl FileTree {
    /// Build a fresh tree for a granted root directory
    ///
    /// The root's immediate children are loaded eagerly; everything below
    /// stays unloaded until expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory or cannot be enumerated.
    pub async fn open(
        root: FsEntry,
        fs_manager: Arc<FsManager>,
        sort_order: SortOrder,
    ) -> Result<Self> {
        if !root.is_dir() {
            return Err(ExplorerError::NotADirectory(root.name));
        }

        let root_id = NodeId(0);
        let root_path = NodePath::root(&root.name);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, TreeNode::new(root_id, root, root_path.clone(), None));

        let mut path_to_node = HashMap::new();
        path_to_node.insert(root_path, root_id);

        let mut tree = Self {
            nodes,
            path_to_node,
            root_id,
            next_id: 1,
            fs_manager,
            sort_order,
        };
        tree.expand_node(root_id).await?;
        Ok(tree)
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Path of the root directory
    pub fn root_path(&self) -> &NodePath {
        &self.nodes[&self.root_id].path
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Get a node by path
    pub fn get_node_by_path(&self, path: &str) -> Option<&TreeNode> {
        self.node_id(path).and_then(|id| self.get_node(id))
    }

    /// Resolve a path to its node ID
    pub fn node_id(&self, path: &str) -> Option<NodeId> {
        self.path_to_node.get(path).copied()
    }

    /// Loaded children of a node, in display order
    pub fn children(&self, id: NodeId) -> Vec<&TreeNode> {
        self.get_node(id)
            .map(|node| {
                node.child_ids()
                    .iter()
                    .filter_map(|child| self.get_node(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all nodes
    pub fn all_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Get number of nodes currently in memory
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Load a directory's children
    ///
    /// Files and already-loaded directories are left alone; storage is only
    /// enumerated the first time. Returns the node's children afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be enumerated. The node is
    /// then still unloaded, so retrying is safe.
    pub async fn expand_node(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self
            .get_node(id)
            .ok_or_else(|| ExplorerError::NodeNotFound(id.to_string()))?;

        if !node.is_dir() {
            return Ok(Vec::new());
        }
        if let Some(children) = &node.children {
            return Ok(children.clone());
        }

        let result = build_children(
            &self.fs_manager,
            &node.entry.handle,
            &node.path,
            self.sort_order,
        )
        .await;

        match result {
            Ok(built) => Ok(self.attach_children(id, built)),
            Err(e) => {
                tracing::warn!("Failed to expand {}: {}", self.describe(id), e);
                Err(e.into())
            }
        }
    }

    /// Load several directories, enumerating them concurrently
    ///
    /// Each node succeeds or fails on its own; a failure leaves only that
    /// node unloaded. Files and loaded directories report success without
    /// touching storage.
    pub async fn expand_nodes(&mut self, ids: &[NodeId]) -> Vec<(NodeId, Result<()>)> {
        let mut outcomes = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.get_node(id) {
                None => outcomes.push((id, Err(ExplorerError::NodeNotFound(id.to_string())))),
                Some(node) if node.is_dir() && !node.is_loaded() => pending.push(node),
                Some(_) => outcomes.push((id, Ok(()))),
            }
        }

        let fs_manager = &self.fs_manager;
        let sort_order = self.sort_order;
        let listings = join_all(pending.iter().map(|node| async move {
            let built =
                build_children(fs_manager, &node.entry.handle, &node.path, sort_order).await;
            (node.id, built)
        }))
        .await;

        for (id, built) in listings {
            match built {
                Ok(built) => {
                    self.attach_children(id, built);
                    outcomes.push((id, Ok(())));
                }
                Err(e) => {
                    tracing::warn!("Failed to expand {}: {}", self.describe(id), e);
                    outcomes.push((id, Err(e.into())));
                }
            }
        }

        outcomes
    }

    /// Load every directory on the way to `path` and return its node
    ///
    /// `path` is a full node path starting with the root's name.
    pub async fn load_path(&mut self, path: &str) -> Result<NodeId> {
        if let Some(id) = self.node_id(path) {
            return Ok(id);
        }

        let root_path = self.root_path().as_str().to_string();
        let relative = path
            .strip_prefix(root_path.as_str())
            .and_then(|rest| rest.strip_prefix(PATH_SEPARATOR))
            .ok_or_else(|| ExplorerError::NodeNotFound(path.to_string()))?;

        let mut current_id = self.root_id;
        for component in relative.split(PATH_SEPARATOR) {
            self.expand_node(current_id).await?;

            let child = self
                .children(current_id)
                .into_iter()
                .find(|child| child.name() == component)
                .map(|child| child.id);

            current_id = child.ok_or_else(|| ExplorerError::NodeNotFound(path.to_string()))?;
        }

        Ok(current_id)
    }

    /// Get all visible nodes in tree order
    ///
    /// The root itself is not listed; its children are always shown.
    /// Below that, a directory's children are visible when the directory is
    /// loaded and `is_expanded` reports it open.
    pub fn get_visible_nodes(&self, is_expanded: impl Fn(&NodePath) -> bool) -> Vec<NodeId> {
        let mut visible = Vec::new();
        if let Some(root) = self.get_node(self.root_id) {
            for &child_id in root.child_ids() {
                self.collect_visible_recursive(child_id, &is_expanded, &mut visible);
            }
        }
        visible
    }

    fn collect_visible_recursive(
        &self,
        id: NodeId,
        is_expanded: &impl Fn(&NodePath) -> bool,
        visible: &mut Vec<NodeId>,
    ) {
        visible.push(id);

        if let Some(node) = self.get_node(id) {
            if node.is_loaded() && is_expanded(&node.path) {
                for &child_id in node.child_ids() {
                    self.collect_visible_recursive(child_id, is_expanded, visible);
                }
            }
        }
    }

    /// Get the parent chain for a node (from root to node)
    pub fn get_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = Some(id);

        while let Some(node_id) = current {
            ancestors.push(node_id);
            current = self.get_node(node_id).and_then(|n| n.parent);
        }

        ancestors.reverse();
        ancestors
    }

    /// Get the depth of a node (root is 0)
    pub fn get_depth(&self, id: NodeId) -> usize {
        self.get_ancestors(id).len().saturating_sub(1)
    }

    fn attach_children(&mut self, id: NodeId, built: Vec<(NodePath, FsEntry)>) -> Vec<NodeId> {
        let mut child_ids = Vec::with_capacity(built.len());
        for (path, entry) in built {
            if self.path_to_node.contains_key(&path) {
                tracing::warn!("Duplicate entry {} ignored", path);
                continue;
            }
            child_ids.push(self.add_node(entry, path, id));
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            tracing::debug!("Loaded {} ({} children)", node.path, child_ids.len());
            node.children = Some(child_ids.clone());
        }
        child_ids
    }

    fn add_node(&mut self, entry: FsEntry, path: NodePath, parent: NodeId) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.path_to_node.insert(path.clone(), id);
        self.nodes
            .insert(id, TreeNode::new(id, entry, path, Some(parent)));

        id
    }

    fn describe(&self, id: NodeId) -> String {
        self.get_node(id)
            .map(|node| node.path.to_string())
            .unwrap_or_else(|| id.to_string())
    }
}
