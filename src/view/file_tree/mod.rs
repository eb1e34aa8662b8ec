// File tree module for lazy-loaded directory hierarchy
//
// This module provides a tree structure for representing a granted directory
// with lazy loading (directories are only enumerated when expanded) and
// path-keyed identity for everything layered on top of it.

pub mod node;
pub mod tree;

pub use node::{NodeId, NodePath, TreeNode, PATH_SEPARATOR};
pub use tree::{build_children, is_hidden, FileTree, SortOrder, HIDDEN_PREFIX};
