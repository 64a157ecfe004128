//! pam-tid - Enables Touch ID for sudo by editing the PAM stack
//!
//! This crate provides:
//! - Directive matching and splicing for `auth sufficient` PAM lines
//! - The check / dry-run / write insertion run
//! - A best-effort append-only audit log
//! - Optional TOML configuration and the command-line surface

pub mod audit;
pub mod cli;
pub mod config;
pub mod pam;

pub use config::Config;
