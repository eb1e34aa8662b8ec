//! Error type surfaced by the explorer core
//!
//! Storage backends speak `std::io::Result`; everything above them (tree,
//! tracker, session) converts into `ExplorerError` so callers can tell a
//! dismissed picker apart from a revoked permission or a failed write.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ExplorerError {
    /// The user dismissed a folder/file access dialog
    UserCancelled,
    /// Permission was refused or revoked mid-session
    AccessDenied(String),
    /// Read or write failure
    Io(io::Error),
    /// The best-effort formatting step is unavailable or failed
    FormatUnsupported(String),
    /// No node with this path exists in the current tree
    NodeNotFound(String),
    /// Operation requires a file node
    NotAFile(String),
    /// Operation requires a directory node
    NotADirectory(String),
}

impl ExplorerError {
    /// Cancellation is a normal outcome and is recovered silently
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, ExplorerError::UserCancelled)
    }
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerError::UserCancelled => write!(f, "Cancelled by user"),
            ExplorerError::AccessDenied(msg) => write!(f, "Access denied: {msg}"),
            ExplorerError::Io(e) => write!(f, "IO error: {e}"),
            ExplorerError::FormatUnsupported(msg) => write!(f, "Format unavailable: {msg}"),
            ExplorerError::NodeNotFound(path) => write!(f, "No such entry: {path}"),
            ExplorerError::NotAFile(path) => write!(f, "Not a file: {path}"),
            ExplorerError::NotADirectory(path) => write!(f, "Not a directory: {path}"),
        }
    }
}

impl std::error::Error for ExplorerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExplorerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ExplorerError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::PermissionDenied {
            ExplorerError::AccessDenied(e.to_string())
        } else {
            ExplorerError::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_maps_to_access_denied() {
        let err: ExplorerError =
            io::Error::new(io::ErrorKind::PermissionDenied, "revoked").into();
        assert!(matches!(err, ExplorerError::AccessDenied(_)));
        assert!(err.to_string().contains("revoked"));
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err: ExplorerError = io::Error::other("disk full").into();
        assert!(matches!(err, ExplorerError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_user_cancelled());
    }

    #[test]
    fn test_cancel_classification() {
        assert!(ExplorerError::UserCancelled.is_user_cancelled());
        assert_eq!(ExplorerError::UserCancelled.to_string(), "Cancelled by user");
    }
}
