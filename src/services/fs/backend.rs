use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Opaque capability token for one storage entry
///
/// Only backends and pickers mint handles. A clone grants the same access
/// as the original; the tree keeps exactly one per node and never clones it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryHandle(PathBuf);

impl EntryHandle {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self(location.into())
    }

    /// Backend-specific location this handle refers to
    pub fn location(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for EntryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Represents a file or directory entry
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub name: String,
    pub entry_type: FsEntryType,
    pub handle: EntryHandle,
}

impl FsEntry {
    pub fn new(name: String, entry_type: FsEntryType, handle: EntryHandle) -> Self {
        Self {
            name,
            entry_type,
            handle,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == FsEntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == FsEntryType::File
    }
}

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsEntryType {
    File,
    Directory,
}

/// Async storage backend trait
///
/// This trait abstracts the storage accessor so the tree and session work the
/// same over the local disk, an in-memory tree, or a browser-granted handle.
#[async_trait]
pub trait FsBackend: Send + Sync {
    /// List entries in a directory (non-recursive)
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read (access revoked,
    /// stale handle, not a directory, etc.)
    async fn read_dir(&self, dir: &EntryHandle) -> io::Result<Vec<FsEntry>>;

    /// Read the full text of a file
    async fn read_file(&self, file: &EntryHandle) -> io::Result<String>;

    /// Replace the full contents of a file
    ///
    /// Either the new contents are fully visible afterwards, or an error is
    /// returned and the previous contents are untouched.
    async fn write_file(&self, file: &EntryHandle, contents: &str) -> io::Result<()>;
}

/// Grants access to a root directory
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Ask for a root directory
    ///
    /// `Ok(None)` means the user dismissed the request.
    async fn request_directory(&self) -> io::Result<Option<FsEntry>>;
}
