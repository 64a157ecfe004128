//! Append-only audit log of insertion outcomes.
//!
//! Stored at `/var/log/pam_tid.log` unless configured otherwise. One
//! plain-text record per line:
//!
//! ```text
//! [2024-03-01 09:15:02] pam_tid.so inserted successfully
//! ```
//!
//! The log is best-effort. Every record opens, appends to and closes the
//! file on its own, and a failed write never changes the outcome of the
//! run. Use [`AuditLog::append`] when the caller wants to see the error.

use chrono::Local;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "/var/log/pam_tid.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped record, creating the file if needed.
    pub fn append(&self, message: &str) -> io::Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{}] {}", timestamp, message)
    }

    /// Append a record, swallowing any failure.
    ///
    /// Permission errors are the expected case when running without root
    /// and stay quiet; anything else is surfaced as a diagnostic warning.
    pub fn record(&self, message: &str) {
        match self.append(message) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                tracing::debug!("Cannot write audit log {}: {}", self.path.display(), e);
            }
            Err(e) => {
                tracing::warn!("Failed to write audit log {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}
