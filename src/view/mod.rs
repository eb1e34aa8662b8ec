//! View layer
//!
//! The lazily-loaded tree and the flattened rows presented from it.

pub mod file_tree;
pub mod rows;
