//! The insertion run: validate, read, decide, splice, then write or print.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use super::directive::{self, MODULE};
use super::error::InsertError;
use crate::audit::AuditLog;

pub const DEFAULT_TARGET_FILE: &str = "/etc/pam.d/sudo";

#[derive(Debug, Clone)]
pub struct InsertOptions {
    /// PAM file to edit.
    pub target: PathBuf,

    /// Only report whether the directive is present.
    pub check_only: bool,

    /// Print the would-be result instead of writing it.
    pub dry_run: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_TARGET_FILE),
            check_only: false,
            dry_run: false,
        }
    }
}

/// Terminal states of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `--check` and the directive is there.
    CheckPresent,
    /// `--check` and the directive is missing.
    CheckAbsent,
    /// Nothing to do, file untouched.
    AlreadyPresent,
    /// New content printed, file untouched.
    DryRun,
    /// Directive inserted and file rewritten.
    Written,
}

impl Outcome {
    /// Process exit status: 1 only for a failed `--check`.
    pub fn exit_status(self) -> u8 {
        match self {
            Outcome::CheckAbsent => 1,
            Outcome::CheckPresent
            | Outcome::AlreadyPresent
            | Outcome::DryRun
            | Outcome::Written => 0,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

pub struct Inserter<'a> {
    options: InsertOptions,
    audit: &'a AuditLog,
}

impl<'a> Inserter<'a> {
    pub fn new(options: InsertOptions, audit: &'a AuditLog) -> Self {
        Self { options, audit }
    }

    pub fn options(&self) -> &InsertOptions {
        &self.options
    }

    /// Run once. Dry-run output goes to `out`.
    pub fn run(&self, out: &mut dyn Write) -> Result<Outcome, InsertError> {
        let path = &self.options.target;

        if !path.is_file() {
            self.audit.record(&format!(
                "ERROR: {} does not exist or is not a file",
                path.display()
            ));
            return Err(InsertError::TargetNotFound { path: path.clone() });
        }

        let content = fs::read_to_string(path).map_err(|source| InsertError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Read {} bytes from {}", content.len(), path.display());

        let present = directive::is_present(&content);

        if self.options.check_only {
            tracing::debug!("{} present in {}: {}", MODULE, path.display(), present);
            return Ok(if present {
                Outcome::CheckPresent
            } else {
                Outcome::CheckAbsent
            });
        }

        if present {
            tracing::info!("{} already present in {}", MODULE, path.display());
            self.audit
                .record(&format!("{} already present—no changes made", MODULE));
            return Ok(Outcome::AlreadyPresent);
        }

        let Some(updated) = directive::splice(&content) else {
            tracing::debug!("No auth sufficient line in {}", path.display());
            self.audit.record("No suitable insertion point found—aborting");
            return Err(InsertError::NoInsertionPoint);
        };

        if self.options.dry_run {
            writeln!(out, "{}", updated).map_err(InsertError::Output)?;
            self.audit.record("Dry run completed—no changes written");
            return Ok(Outcome::DryRun);
        }

        fs::write(path, &updated).map_err(|source| InsertError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Inserted {} into {}", MODULE, path.display());
        self.audit.record(&format!("{} inserted successfully", MODULE));

        Ok(Outcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SUDO: &str = "#comment\nauth required pam_deny.so\nauth sufficient pam_smartcard.so\nauth sufficient pam_unix.so\n";
    const SUDO_WITH_TID: &str = "#comment\nauth required pam_deny.so\nauth sufficient pam_smartcard.so\nauth sufficient pam_unix.so\nauth       sufficient     pam_tid.so\n";

    struct Fixture {
        _tmp: TempDir,
        target: PathBuf,
        audit: AuditLog,
    }

    impl Fixture {
        fn new(content: &str) -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("sudo");
            fs::write(&target, content).unwrap();
            let audit = AuditLog::new(tmp.path().join("pam_tid.log"));
            Self {
                _tmp: tmp,
                target,
                audit,
            }
        }

        fn run(&self, check_only: bool, dry_run: bool) -> (Result<Outcome, InsertError>, String) {
            let options = InsertOptions {
                target: self.target.clone(),
                check_only,
                dry_run,
            };
            let mut out = Vec::new();
            let result = Inserter::new(options, &self.audit).run(&mut out);
            (result, String::from_utf8(out).unwrap())
        }

        fn content(&self) -> String {
            fs::read_to_string(&self.target).unwrap()
        }

        fn log(&self) -> String {
            fs::read_to_string(self.audit.path()).unwrap_or_default()
        }
    }

    #[test]
    fn inserts_after_last_anchor() {
        let fx = Fixture::new(SUDO);

        let (result, out) = fx.run(false, false);

        assert_eq!(result.unwrap(), Outcome::Written);
        assert_eq!(fx.content(), SUDO_WITH_TID);
        assert!(out.is_empty());
        assert!(fx.log().contains("pam_tid.so inserted successfully"));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let fx = Fixture::new(SUDO);

        assert_eq!(fx.run(false, false).0.unwrap(), Outcome::Written);
        let once = fx.content();
        assert_eq!(fx.run(false, false).0.unwrap(), Outcome::AlreadyPresent);

        assert_eq!(fx.content(), once);
        assert!(fx.log().contains("pam_tid.so already present—no changes made"));
    }

    #[test]
    fn already_present_anywhere_leaves_file_alone() {
        let content = "auth       sufficient     pam_tid.so\n# comment\nauth sufficient pam_unix.so\n";
        let fx = Fixture::new(content);

        assert_eq!(fx.run(false, false).0.unwrap(), Outcome::AlreadyPresent);
        assert_eq!(fx.content(), content);
    }

    #[test]
    fn check_reports_presence_without_side_effects() {
        let absent = Fixture::new(SUDO);
        let present = Fixture::new(SUDO_WITH_TID);

        assert_eq!(absent.run(true, false).0.unwrap(), Outcome::CheckAbsent);
        assert_eq!(present.run(true, false).0.unwrap(), Outcome::CheckPresent);

        assert_eq!(absent.content(), SUDO);
        assert_eq!(present.content(), SUDO_WITH_TID);
        assert!(!absent.audit.path().exists());
    }

    #[test]
    fn check_wins_over_dry_run() {
        let fx = Fixture::new(SUDO);

        let (result, out) = fx.run(true, true);

        assert_eq!(result.unwrap(), Outcome::CheckAbsent);
        assert!(out.is_empty());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::CheckPresent.exit_status(), 0);
        assert_eq!(Outcome::CheckAbsent.exit_status(), 1);
        assert_eq!(Outcome::AlreadyPresent.exit_status(), 0);
        assert_eq!(Outcome::DryRun.exit_status(), 0);
        assert_eq!(Outcome::Written.exit_status(), 0);
    }

    #[test]
    fn dry_run_prints_and_does_not_write() {
        let fx = Fixture::new(SUDO);

        let (result, out) = fx.run(false, true);

        assert_eq!(result.unwrap(), Outcome::DryRun);
        assert_eq!(out, format!("{}\n", SUDO_WITH_TID));
        assert_eq!(fx.content(), SUDO);
        assert!(fx.log().contains("Dry run completed—no changes written"));
    }

    #[test]
    fn dry_run_is_pure_on_failure_too() {
        let content = "auth required pam_deny.so\n";
        let fx = Fixture::new(content);

        let (result, out) = fx.run(false, true);

        assert!(matches!(result, Err(InsertError::NoInsertionPoint)));
        assert!(out.is_empty());
        assert_eq!(fx.content(), content);
    }

    #[test]
    fn missing_anchor_aborts_without_writing() {
        let content = "# sudo: auth account password session\nauth required pam_opendirectory.so\naccount required pam_permit.so\n";
        let fx = Fixture::new(content);

        let err = fx.run(false, false).0.unwrap_err();

        assert!(matches!(err, InsertError::NoInsertionPoint));
        assert_eq!(err.to_string(), "No suitable insertion point found");
        assert_eq!(fx.content(), content);
        assert!(fx.log().contains("No suitable insertion point found—aborting"));
    }

    #[test]
    fn missing_target_is_reported_and_logged() {
        let fx = Fixture::new(SUDO);
        let missing = fx.target.with_file_name("nope");
        let options = InsertOptions {
            target: missing.clone(),
            ..InsertOptions::default()
        };

        let err = Inserter::new(options, &fx.audit)
            .run(&mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, InsertError::TargetNotFound { ref path } if path == &missing));
        assert_eq!(
            err.to_string(),
            format!("{}: does not exist or is not a file", missing.display())
        );
        assert!(fx.log().contains(&format!(
            "ERROR: {} does not exist or is not a file",
            missing.display()
        )));
    }

    #[test]
    fn directory_target_is_not_a_file() {
        let fx = Fixture::new(SUDO);
        let dir = fx.target.parent().unwrap().to_path_buf();
        let options = InsertOptions {
            target: dir,
            ..InsertOptions::default()
        };

        let err = Inserter::new(options, &fx.audit)
            .run(&mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, InsertError::TargetNotFound { .. }));
    }

    #[test]
    fn non_utf8_target_is_a_read_error() {
        let fx = Fixture::new("");
        fs::write(&fx.target, [0x61, 0xff, 0xfe, 0x0a]).unwrap();

        let err = fx.run(false, false).0.unwrap_err();
        assert!(matches!(err, InsertError::Read { .. }));
    }

    #[test]
    fn unwritable_audit_log_does_not_change_outcome() {
        let fx = Fixture::new(SUDO);
        let audit = AuditLog::new(fx.target.with_file_name("no-such-dir").join("log"));
        let options = InsertOptions {
            target: fx.target.clone(),
            ..InsertOptions::default()
        };

        let outcome = Inserter::new(options, &audit).run(&mut Vec::new()).unwrap();

        assert_eq!(outcome, Outcome::Written);
        assert_eq!(fx.content(), SUDO_WITH_TID);
    }

    #[test]
    fn default_options_target_sudo() {
        let options = InsertOptions::default();
        assert_eq!(options.target, PathBuf::from("/etc/pam.d/sudo"));
        assert!(!options.check_only);
        assert!(!options.dry_run);
    }
}
