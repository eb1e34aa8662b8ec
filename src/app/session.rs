//! Session controller
//!
//! Owns the tree, the selection/dirty tracker and the per-file text buffers,
//! and wires them to storage, the editing surface and keyboard shortcuts.
//! Storage failures stop here: they become a status message for the user and
//! an `Err` for the caller, and never leave the tree half-updated.

use super::surface::{EditingSurface, SurfaceEvent};
use crate::config::{Config, ConfigError, ExplorerConfig};
use crate::error::{ExplorerError, Result};
use crate::input::keybindings::{
    Action, FocusContext, KeyChord, KeyOutcome, ShortcutRegistry, SubscriptionId,
};
use crate::model::{Selection, SelectionTracker};
use crate::primitives::language::Language;
use crate::services::fs::{DirectoryPicker, FsManager};
use crate::view::file_tree::{FileTree, NodeId, NodePath};
use crate::view::rows::{visible_rows, ExplorerRow};
use crossterm::event::KeyEvent;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub struct Session {
    fs_manager: Arc<FsManager>,
    picker: Arc<dyn DirectoryPicker>,
    surface: Box<dyn EditingSurface>,
    config: ExplorerConfig,

    /// None until a folder has been opened
    tree: Option<FileTree>,
    tracker: SelectionTracker,

    /// Loaded text per file, including unsaved edits
    buffers: HashMap<NodePath, String>,

    bindings: Vec<(KeyChord, Action)>,
    shortcuts: ShortcutRegistry,
    subscriptions: Vec<SubscriptionId>,

    status_message: Option<String>,
}

impl Session {
    /// Create a detached session with no folder open
    pub fn new(
        fs_manager: Arc<FsManager>,
        picker: Arc<dyn DirectoryPicker>,
        surface: Box<dyn EditingSurface>,
        config: &Config,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            fs_manager,
            picker,
            surface,
            config: config.explorer.clone(),
            tree: None,
            tracker: SelectionTracker::new(),
            buffers: HashMap::new(),
            bindings: config.shortcuts()?,
            shortcuts: ShortcutRegistry::new(),
            subscriptions: Vec::new(),
            status_message: None,
        })
    }

    /// Register the configured shortcuts. Calling it twice is harmless.
    pub fn attach(&mut self) {
        if self.is_attached() {
            return;
        }
        for (chord, action) in &self.bindings {
            let id = self.shortcuts.subscribe(*chord, *action);
            self.subscriptions.push(id);
        }
        tracing::debug!("Attached {} shortcuts", self.subscriptions.len());
    }

    /// Remove every shortcut registered by `attach`
    pub fn detach(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.shortcuts.unsubscribe(id);
        }
        tracing::debug!("Detached shortcuts");
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Ask the picker for a folder and replace the tree with it
    ///
    /// A dismissed picker returns `ExplorerError::UserCancelled` with nothing
    /// changed and no status message. On any other failure the previous tree
    /// and its state are kept.
    pub async fn open_folder(&mut self) -> Result<()> {
        let picked = self.picker.request_directory().await;
        let root = match picked {
            Ok(Some(root)) => root,
            Ok(None) => {
                tracing::debug!("Open folder cancelled");
                return Err(ExplorerError::UserCancelled);
            }
            Err(e) => return Err(self.report(e.into())),
        };

        let name = root.name.clone();
        let opened =
            FileTree::open(root, Arc::clone(&self.fs_manager), self.config.sort_order).await;
        let tree = match opened {
            Ok(tree) => tree,
            Err(e) => return Err(self.report(e)),
        };

        tracing::info!("Opened folder {} ({} entries)", name, tree.node_count() - 1);
        self.tree = Some(tree);
        self.tracker.reset();
        self.buffers.clear();
        self.set_status_message(format!("Opened {name}"));
        Ok(())
    }

    /// Select the file at `path` and show its text on the surface
    ///
    /// Storage is read only the first time a file is opened; afterwards the
    /// cached buffer is used so edits survive switching files. The dirty flag
    /// is never touched here.
    pub async fn open_file(&mut self, path: &str) -> Result<()> {
        let Some(tree) = self.tree.as_ref() else {
            return Err(ExplorerError::NodeNotFound(path.to_string()));
        };
        let Some(node) = tree.get_node_by_path(path) else {
            return Err(self.report(ExplorerError::NodeNotFound(path.to_string())));
        };
        if !node.is_file() {
            return Err(ExplorerError::NotAFile(path.to_string()));
        }

        if !self.buffers.contains_key(&node.path) {
            let read = self.fs_manager.read_file(&node.entry.handle).await;
            match read {
                Ok(text) => {
                    self.buffers.insert(node.path.clone(), text);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path, e);
                    return Err(self.report(e.into()));
                }
            }
        }

        self.tracker.select(node)?;
        let language = Language::from_path(Path::new(node.name()));
        let text = self.buffers.get(&node.path).map(String::as_str).unwrap_or("");
        self.surface.set_content(text, language);
        Ok(())
    }

    /// Store the surface's text as the selected file's buffer and mark it dirty
    pub fn on_content_changed(&mut self, text: String) {
        let Some(selection) = self.tracker.selected() else {
            tracing::debug!("Content change with no file selected ignored");
            return;
        };
        let key = selection.path.clone();
        self.buffers.insert(key.clone(), text);
        self.tracker.mark_dirty(&key);
    }

    /// Write the selected file's buffer back to storage
    ///
    /// No file selected is a no-op. The dirty flag is cleared only after the
    /// write succeeds. Taking `&mut self` keeps a second save from starting
    /// while one is pending.
    pub async fn save_file(&mut self) -> Result<()> {
        let Some(Selection { id, path }) = self.tracker.selected().cloned() else {
            tracing::debug!("Save with no file selected");
            return Ok(());
        };
        let Some(node) = self.tree.as_ref().and_then(|tree| tree.get_node(id)) else {
            return Err(self.report(ExplorerError::NodeNotFound(path.to_string())));
        };
        let Some(mut contents) = self.buffers.get(&path).cloned() else {
            return Err(self.report(ExplorerError::NodeNotFound(path.to_string())));
        };

        if self.config.format_on_save {
            let language = Language::from_path(Path::new(node.name()));
            match self.surface.request_format(&contents, language) {
                Ok(Some(formatted)) => {
                    contents = formatted;
                    self.buffers.insert(path.clone(), contents.clone());
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Formatting skipped for {}: {}", path, e),
            }
        }

        let written = self.fs_manager.write_file(&node.entry.handle, &contents).await;
        match written {
            Ok(()) => {
                self.tracker.clear_dirty(&path);
                tracing::info!("Saved {}", path);
                self.set_status_message(format!("Saved {path}"));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to save {}: {}", path, e);
                Err(self.report(e.into()))
            }
        }
    }

    pub async fn handle_surface_event(&mut self, event: SurfaceEvent) -> Result<()> {
        match event {
            SurfaceEvent::Changed(text) => {
                self.on_content_changed(text);
                Ok(())
            }
            SurfaceEvent::SaveIntent => self.save_file().await,
        }
    }

    /// Dispatch a key event received while `focus` has keyboard focus
    ///
    /// Bound chords are always `Consumed` so the platform default never runs,
    /// but only the initial press triggers the action. Focus on the surface
    /// leaves shortcuts to the surface itself. Action failures are already
    /// reported through the status message.
    pub async fn handle_key(&mut self, event: &KeyEvent, focus: FocusContext) -> KeyOutcome {
        if focus != FocusContext::Application {
            return KeyOutcome::Ignored;
        }
        if self.shortcuts.lookup(event).is_none() {
            return KeyOutcome::Ignored;
        }
        let Some(action) = self.shortcuts.resolve(event) else {
            return KeyOutcome::Consumed;
        };

        tracing::debug!("Shortcut {:?}", action);
        let result = match action {
            Action::Save => self.save_file().await,
            Action::OpenFolder => self.open_folder().await,
        };
        if let Err(e) = result {
            tracing::debug!("Shortcut {:?} failed: {}", action, e);
        }
        KeyOutcome::Consumed
    }

    /// Open or close a directory, loading it on first open
    pub async fn toggle_expansion(&mut self, path: &str) -> Result<bool> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(ExplorerError::NodeNotFound(path.to_string()));
        };
        let toggled = self.tracker.toggle_expansion(tree, path).await;
        match toggled {
            Ok(expanded) => Ok(expanded),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Load and open the directories above `path`
    pub async fn reveal(&mut self, path: &str) -> Result<NodeId> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(ExplorerError::NodeNotFound(path.to_string()));
        };
        let revealed = self.tracker.reveal(tree, path).await;
        match revealed {
            Ok(id) => Ok(id),
            Err(e) => Err(self.report(e)),
        }
    }

    pub fn tree(&self) -> Option<&FileTree> {
        self.tree.as_ref()
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.tracker.selected()
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.tracker.is_dirty(path)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tracker.dirty_paths().next().is_some()
    }

    /// Cached text of a file, if it has been opened
    pub fn buffer(&self, path: &str) -> Option<&str> {
        self.buffers.get(path).map(String::as_str)
    }

    /// Rows to present, in tree order
    pub fn rows(&self) -> Vec<ExplorerRow> {
        match &self.tree {
            Some(tree) => visible_rows(tree, &self.tracker),
            None => Vec::new(),
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Surface a non-cancellation error to the user and hand it back
    fn report(&mut self, error: ExplorerError) -> ExplorerError {
        if !error.is_user_cancelled() {
            tracing::warn!("{}", error);
            self.set_status_message(error.to_string());
        }
        error
    }
}
