//! Editing-session state that sits beside the tree

pub mod tracker;

pub use tracker::{Selection, SelectionTracker};
