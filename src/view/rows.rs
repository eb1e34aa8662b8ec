use super::file_tree::{FileTree, NodeId, NodePath};
use crate::model::SelectionTracker;
use std::fmt;

/// One line of the explorer as a consumer would draw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerRow {
    pub id: NodeId,
    pub path: NodePath,
    pub name: String,
    /// Indentation level; children of the root are 0
    pub depth: usize,
    pub is_dir: bool,
    pub expanded: bool,
    pub selected: bool,
    pub dirty: bool,
}

/// Get the visible rows in tree order with their display state
pub fn visible_rows(tree: &FileTree, tracker: &SelectionTracker) -> Vec<ExplorerRow> {
    let selected = tracker.selected().map(|s| s.id);

    tree.get_visible_nodes(|path| tracker.is_expanded(path.as_str()))
        .into_iter()
        .filter_map(|id| {
            let node = tree.get_node(id)?;
            Some(ExplorerRow {
                id,
                path: node.path.clone(),
                name: node.name().to_string(),
                depth: tree.get_depth(id).saturating_sub(1),
                is_dir: node.is_dir(),
                expanded: node.is_dir() && tracker.is_expanded(node.path.as_str()),
                selected: selected == Some(id),
                dirty: tracker.is_dirty(node.path.as_str()),
            })
        })
        .collect()
}

impl fmt::Display for ExplorerRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = if self.selected { ">" } else { " " };
        let indent = "  ".repeat(self.depth);
        let icon = match (self.is_dir, self.expanded) {
            (true, true) => "▼ ",
            (true, false) => "▶ ",
            (false, _) => "  ",
        };
        write!(f, "{cursor} {indent}{icon}{}", self.name)?;
        if self.dirty {
            write!(f, " ●")?;
        }
        Ok(())
    }
}
