//! Error types for the organizer engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for organizer operations.
pub type Result<T> = std::result::Result<T, OrganizerError>;

/// Errors that can occur while monitoring or organizing a directory.
#[derive(Error, Debug)]
pub enum OrganizerError {
    /// The target directory does not exist (or is not a directory).
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Access to the target directory was denied and not re-granted.
    #[error(
        "permission denied for {}: grant this folder read and write access \
         (System Settings > Privacy & Security > Files and Folders, or fix its \
         ownership and mode) and try again",
        path.display()
    )]
    PermissionDenied { path: PathBuf },

    /// Enumeration or another unexpected I/O failure.
    #[error("file system error: {message}")]
    FileSystemError { message: String },

    /// A name matched a capture pattern but its date could not be used.
    #[error("invalid capture name: {name}")]
    InvalidScreenshot { name: String },

    /// A single file could not be moved into place.
    #[error("failed to move {}: {message}", path.display())]
    MoveFailed { path: PathBuf, message: String },

    /// The OS watch could not be created or attached.
    #[error("watch error: {0}")]
    Watch(#[from] notify_debouncer_mini::notify::Error),
}

impl OrganizerError {
    pub(crate) fn file_system(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::FileSystemError {
            message: format!("{context}: {err}"),
        }
    }
}
