use crate::services::fs::FsEntry;
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Separator between path components
pub const PATH_SEPARATOR: char = '/';

/// Stable identity of a node: its ancestor names joined with `/`
///
/// Unlike `NodeId`, a path means the same entry across rebuilds of the same
/// folder, so expansion, selection and dirty state are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    /// Path of a tree root
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Path of the child `name` below this one
    pub fn join(&self, name: &str) -> Self {
        Self(format!("{}{}{}", self.0, PATH_SEPARATOR, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last component
    pub fn name(&self) -> &str {
        self.0
            .rsplit_once(PATH_SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

/// Represents a node in the file tree
#[derive(Debug)]
pub struct TreeNode {
    /// Unique identifier within one tree snapshot
    pub id: NodeId,
    /// Name, kind and storage handle
    pub entry: FsEntry,
    /// Identity key
    pub path: NodePath,
    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,
    /// Child node IDs; `None` until the directory has been enumerated
    pub children: Option<Vec<NodeId>>,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(id: NodeId, entry: FsEntry, path: NodePath, parent: Option<NodeId>) -> Self {
        Self {
            id,
            entry,
            path,
            parent,
            children: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn is_dir(&self) -> bool {
        self.entry.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.entry.is_file()
    }

    /// A directory is loaded once it has been enumerated, even if it is empty
    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }

    /// Loaded children, or an empty slice for files and unloaded directories
    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }
}
