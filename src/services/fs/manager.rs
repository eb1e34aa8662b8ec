use super::backend::{EntryHandle, FsBackend, FsEntry};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

/// Type alias for pending directory requests map
type PendingDirRequests =
    Arc<Mutex<HashMap<PathBuf, Vec<oneshot::Sender<io::Result<Vec<FsEntry>>>>>>>;

/// Manages storage operations with request deduplication
///
/// The FsManager sits between the explorer and the storage backend,
/// providing:
/// - Request deduplication (concurrent listings of the same directory)
/// - A single place to trace storage traffic
pub struct FsManager {
    backend: Arc<dyn FsBackend>,
    /// Pending directory listing requests
    /// Map of location -> list of channels waiting for the result
    pending_dir_requests: PendingDirRequests,
}

impl fmt::Debug for FsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsManager")
            .field("backend", &"<dyn FsBackend>")
            .field("pending_dir_requests", &"<mutex>")
            .finish()
    }
}

impl FsManager {
    /// Create a new filesystem manager with the given backend
    pub fn new(backend: Arc<dyn FsBackend>) -> Self {
        Self {
            backend,
            pending_dir_requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// List directory contents with request deduplication
    ///
    /// If multiple requests for the same directory are made concurrently,
    /// only one storage operation will be performed and all requesters
    /// will receive the same result.
    pub async fn list_dir(&self, dir: &EntryHandle) -> io::Result<Vec<FsEntry>> {
        let key = dir.location().to_path_buf();

        let (rx, should_execute) = {
            let mut pending = self.pending_dir_requests.lock().await;

            if let Some(senders) = pending.get_mut(&key) {
                // There's already a request in progress, just add our channel
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                (rx, false)
            } else {
                let (tx, rx) = oneshot::channel();
                pending.insert(key.clone(), vec![tx]);
                (rx, true)
            }
        };

        if should_execute {
            tracing::trace!("list_dir: enumerating {}", dir);
            let result = self.backend.read_dir(dir).await;

            // Notify all waiting requesters
            let mut pending = self.pending_dir_requests.lock().await;
            if let Some(senders) = pending.remove(&key) {
                for sender in senders {
                    let _ = sender.send(
                        result
                            .as_ref()
                            .map(|v| v.clone())
                            .map_err(|e| io::Error::new(e.kind(), e.to_string())),
                    );
                }
            }

            result
        } else {
            tracing::trace!("list_dir: joining pending request for {}", dir);
            rx.await
                .unwrap_or_else(|_| Err(io::Error::other("Request cancelled")))
        }
    }

    /// Read the full text of a file
    pub async fn read_file(&self, file: &EntryHandle) -> io::Result<String> {
        tracing::trace!("read_file: {}", file);
        self.backend.read_file(file).await
    }

    /// Replace the contents of a file
    pub async fn write_file(&self, file: &EntryHandle, contents: &str) -> io::Result<()> {
        tracing::trace!("write_file: {} ({} bytes)", file, contents.len());
        self.backend.write_file(file, contents).await
    }
}

impl Clone for FsManager {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            pending_dir_requests: Arc::clone(&self.pending_dir_requests),
        }
    }
}
