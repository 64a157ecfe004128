//! Command-line surface for `pam-tid`.

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::pam::{InsertOptions, Inserter, Outcome};

#[derive(Parser, Debug)]
#[command(name = "pam-tid")]
#[command(author, version, about = "Ensures Touch ID is enabled for sudo")]
pub struct Cli {
    /// Check if pam_tid.so is present (exit 0 if present, 1 if not)
    #[arg(long)]
    pub check: bool,

    /// Target PAM file [default: /etc/pam.d/sudo]
    #[arg(long, env = "PAM_TID_FILE")]
    pub file: Option<PathBuf>,

    /// Simulate changes without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, env = "PAM_TID_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    fn insert_options(&self, config: &Config) -> InsertOptions {
        InsertOptions {
            target: self.file.clone().unwrap_or_else(|| config.pam_file()),
            check_only: self.check,
            dry_run: self.dry_run,
        }
    }
}

pub fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::load(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_logging(log_level);

    let audit = AuditLog::new(config.log_file());
    let inserter = Inserter::new(cli.insert_options(&config), &audit);
    tracing::debug!("Options: {:?}", inserter.options());

    let outcome = inserter.run(&mut io::stdout().lock())?;
    tracing::debug!("Outcome: {:?}", outcome);

    Ok(outcome)
}

/// Diagnostics go to stderr so dry-run output on stdout stays clean.
fn init_logging(level: &str) {
    // try_init: a second call (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .try_init();
}
