use std::io;
use std::path::PathBuf;

/// Fatal errors from a directive insertion run.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    /// Target path is missing or is not a regular file.
    #[error("{}: does not exist or is not a file", .path.display())]
    TargetNotFound { path: PathBuf },

    /// No `auth sufficient pam_*.so` line to insert after.
    #[error("No suitable insertion point found")]
    NoInsertionPoint,

    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Dry-run output could not be written to stdout.
    #[error("Failed to print dry-run output")]
    Output(#[source] io::Error),
}
