// Storage abstraction layer for async, pluggable directory/file access
//
// The explorer never touches the disk directly: every enumeration, read and
// write goes through an `FsBackend`, and root directories are granted by a
// `DirectoryPicker`.

pub mod backend;
pub mod local;
pub mod manager;
pub mod memory;
pub mod slow;

pub use backend::{DirectoryPicker, EntryHandle, FsBackend, FsEntry, FsEntryType};
pub use local::{LocalDirectoryPicker, LocalFsBackend};
pub use manager::FsManager;
pub use memory::{FixedDirectoryPicker, MemoryFsBackend};
pub use slow::{BackendMetrics, SlowFsBackend, SlowFsConfig};
