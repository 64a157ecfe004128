//! Enabling `pam_tid.so` in a PAM service file.
//!
//! [`directive`] holds the pure text matching and splicing; [`Inserter`]
//! wraps it with the file checks, the read/write and the audit records
//! that make up one run.

pub mod directive;
mod error;
mod inserter;

pub use error::InsertError;
pub use inserter::{DEFAULT_TARGET_FILE, InsertOptions, Inserter, Outcome};
