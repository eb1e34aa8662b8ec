//! In-memory storage backend
//!
//! A virtual filesystem for embedding the explorer where no native disk is
//! available, and for tests. Directories list their children in insertion
//! order, which lets callers observe exactly what the storage layer returned.
//! Failures can be injected per directory (revoked access) or globally for
//! reads and writes.

use super::backend::{DirectoryPicker, EntryHandle, FsBackend, FsEntry, FsEntryType};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum MemNode {
    Directory(Vec<String>),
    File(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: HashMap<PathBuf, MemNode>,
    revoked: HashSet<PathBuf>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryState {
    fn is_revoked(&self, path: &Path) -> bool {
        path.ancestors().any(|p| self.revoked.contains(p))
    }

    fn ensure_dir(&mut self, path: &Path) {
        if self.nodes.contains_key(path) {
            return;
        }
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent);
            self.link_child(parent, path);
        }
        self.nodes
            .insert(path.to_path_buf(), MemNode::Directory(Vec::new()));
    }

    fn link_child(&mut self, parent: &Path, child: &Path) {
        let Some(name) = child.file_name() else {
            return;
        };
        let name = name.to_string_lossy().into_owned();
        if let Some(MemNode::Directory(children)) = self.nodes.get_mut(parent) {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }
}

fn denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("Access revoked: {:?}", path),
    )
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("No such entry: {:?}", path))
}

/// In-memory filesystem backend
#[derive(Debug)]
pub struct MemoryFsBackend {
    state: Mutex<MemoryState>,
}

impl Default for MemoryFsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFsBackend {
    /// Create an empty filesystem containing only `/`
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state.ensure_dir(Path::new("/"));
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory and any missing parents
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.state().ensure_dir(path.as_ref());
    }

    /// Create or overwrite a file, creating missing parents
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        let mut state = self.state();
        if let Some(parent) = path.parent() {
            state.ensure_dir(parent);
            state.link_child(parent, path);
        }
        state
            .nodes
            .insert(path.to_path_buf(), MemNode::File(contents.to_string()));
    }

    /// Current contents of a file, if it exists
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.state().nodes.get(path.as_ref()) {
            Some(MemNode::File(contents)) => Some(contents.clone()),
            _ => None,
        }
    }

    /// Revoke access to a directory and everything below it
    pub fn revoke(&self, path: impl AsRef<Path>) {
        self.state().revoked.insert(path.as_ref().to_path_buf());
    }

    /// Restore access previously revoked with [`revoke`](Self::revoke)
    pub fn restore(&self, path: impl AsRef<Path>) {
        self.state().revoked.remove(path.as_ref());
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Build a directory entry for `path`, as a picker would grant it
    pub fn directory_entry(&self, path: impl AsRef<Path>) -> io::Result<FsEntry> {
        let path = path.as_ref();
        let state = self.state();
        match state.nodes.get(path) {
            Some(MemNode::Directory(_)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "/".to_string());
                Ok(FsEntry::new(
                    name,
                    FsEntryType::Directory,
                    EntryHandle::new(path),
                ))
            }
            Some(MemNode::File(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a directory: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }
}

#[async_trait]
impl FsBackend for MemoryFsBackend {
    async fn read_dir(&self, dir: &EntryHandle) -> io::Result<Vec<FsEntry>> {
        let path = dir.location();
        let state = self.state();
        if state.is_revoked(path) {
            return Err(denied(path));
        }

        let children = match state.nodes.get(path) {
            Some(MemNode::Directory(children)) => children,
            Some(MemNode::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Path is not a directory: {:?}", path),
                ))
            }
            None => return Err(not_found(path)),
        };

        let entries = children
            .iter()
            .filter_map(|name| {
                let child_path = path.join(name);
                let entry_type = match state.nodes.get(&child_path)? {
                    MemNode::Directory(_) => FsEntryType::Directory,
                    MemNode::File(_) => FsEntryType::File,
                };
                Some(FsEntry::new(
                    name.clone(),
                    entry_type,
                    EntryHandle::new(child_path),
                ))
            })
            .collect();

        Ok(entries)
    }

    async fn read_file(&self, file: &EntryHandle) -> io::Result<String> {
        let path = file.location();
        let state = self.state();
        if state.is_revoked(path) {
            return Err(denied(path));
        }
        if state.fail_reads {
            return Err(io::Error::other("Injected read failure"));
        }
        match state.nodes.get(path) {
            Some(MemNode::File(contents)) => Ok(contents.clone()),
            Some(MemNode::Directory(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is a directory: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }

    async fn write_file(&self, file: &EntryHandle, contents: &str) -> io::Result<()> {
        let path = file.location();
        let mut state = self.state();
        if state.is_revoked(path) {
            return Err(denied(path));
        }
        if state.fail_writes {
            return Err(io::Error::other("Injected write failure"));
        }
        match state.nodes.get_mut(path) {
            Some(MemNode::File(existing)) => {
                *existing = contents.to_string();
                Ok(())
            }
            Some(MemNode::Directory(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is a directory: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }
}

/// Picker over a [`MemoryFsBackend`] that grants a configurable directory
///
/// With no directory configured it behaves like a dismissed dialog.
#[derive(Debug)]
pub struct FixedDirectoryPicker {
    backend: Arc<MemoryFsBackend>,
    root: Mutex<Option<PathBuf>>,
}

impl FixedDirectoryPicker {
    pub fn new(backend: Arc<MemoryFsBackend>, root: Option<PathBuf>) -> Self {
        Self {
            backend,
            root: Mutex::new(root),
        }
    }

    /// Change the directory granted by the next request
    pub fn set_root(&self, root: Option<PathBuf>) {
        *self.root.lock().unwrap_or_else(PoisonError::into_inner) = root;
    }
}

#[async_trait]
impl DirectoryPicker for FixedDirectoryPicker {
    async fn request_directory(&self) -> io::Result<Option<FsEntry>> {
        let root = self
            .root
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match root {
            Some(path) => self.backend.directory_entry(path).map(Some),
            None => Ok(None),
        }
    }
}
