use super::backend::{DirectoryPicker, EntryHandle, FsBackend, FsEntry, FsEntryType};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Local filesystem backend built on `tokio::fs`
#[derive(Debug, Default)]
pub struct LocalFsBackend;

impl LocalFsBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Sibling path used while writing; hidden so it never surfaces in the tree
fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.folio-tmp", name, std::process::id()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[async_trait]
impl FsBackend for LocalFsBackend {
    async fn read_dir(&self, dir: &EntryHandle) -> io::Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir.location()).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            let entry_type = if file_type.is_symlink() {
                // Follow the link; broken links are skipped
                match tokio::fs::metadata(&path).await {
                    Ok(meta) if meta.is_dir() => FsEntryType::Directory,
                    Ok(_) => FsEntryType::File,
                    Err(e) => {
                        tracing::debug!("Skipping broken symlink {:?}: {}", path, e);
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                FsEntryType::Directory
            } else {
                FsEntryType::File
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(FsEntry::new(name, entry_type, EntryHandle::new(path)));
        }

        Ok(entries)
    }

    async fn read_file(&self, file: &EntryHandle) -> io::Result<String> {
        tokio::fs::read_to_string(file.location()).await
    }

    async fn write_file(&self, file: &EntryHandle, contents: &str) -> io::Result<()> {
        // Write through symlinks so the link itself stays in place
        let target = match tokio::fs::canonicalize(file.location()).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => file.location().to_path_buf(),
            Err(e) => return Err(e),
        };
        let original_metadata = tokio::fs::metadata(&target).await.ok();
        let temp_path = temp_path_for(&target);

        if let Err(e) = write_synced(&temp_path, contents.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Some(meta) = original_metadata {
            if let Err(e) = tokio::fs::set_permissions(&temp_path, meta.permissions()).await {
                tracing::warn!("Failed to copy permissions onto {:?}: {}", temp_path, e);
            }
        }

        // Atomic rename
        if let Err(e) = tokio::fs::rename(&temp_path, &target).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        Ok(())
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

/// Picker that grants a fixed local directory
///
/// Built with `None` it behaves like a dismissed dialog.
#[derive(Debug, Clone, Default)]
pub struct LocalDirectoryPicker {
    path: Option<PathBuf>,
}

impl LocalDirectoryPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DirectoryPicker for LocalDirectoryPicker {
    async fn request_directory(&self) -> io::Result<Option<FsEntry>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let path = tokio::fs::canonicalize(path).await?;
        if !tokio::fs::metadata(&path).await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a directory: {:?}", path),
            ));
        }

        Ok(Some(FsEntry::new(
            display_name(&path),
            FsEntryType::Directory,
            EntryHandle::new(path),
        )))
    }
}
