//! Textual matching and splicing of PAM `auth sufficient` directives.
//!
//! Everything here is pure string work over the whole file content; no
//! I/O happens in this module.

use once_cell::sync::Lazy;
use regex::Regex;

/// The module this tool enables.
pub const MODULE: &str = "pam_tid.so";

/// Line inserted after the anchor. Carries its own leading newline and no
/// trailing one, so the splice keeps whatever line ending followed the
/// anchor.
pub const DIRECTIVE_LINE: &str = "\nauth       sufficient     pam_tid.so";

/// Exact form of the directive, tolerant of whitespace between tokens.
static TARGET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^auth\s+sufficient\s+pam_tid\.so$").expect("target pattern is valid")
});

/// Any `auth sufficient pam_<name>.so` line.
static ANCHOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^auth\s+sufficient\s+pam_\w+\.so$").expect("anchor pattern is valid")
});

/// Whether the directive already appears anywhere in `content`.
pub fn is_present(content: &str) -> bool {
    TARGET_PATTERN.is_match(content)
}

/// Byte offset just past the last anchor line, or `None` if there is none.
pub fn insertion_point(content: &str) -> Option<usize> {
    ANCHOR_PATTERN.find_iter(content).last().map(|m| m.end())
}

/// Insert [`DIRECTIVE_LINE`] after the last anchor line.
///
/// Returns `None` when `content` has no anchor. The caller is expected to
/// have ruled out the already-present case with [`is_present`].
pub fn splice(content: &str) -> Option<String> {
    let at = insertion_point(content)?;

    let mut out = String::with_capacity(content.len() + DIRECTIVE_LINE.len());
    out.push_str(&content[..at]);
    out.push_str(DIRECTIVE_LINE);
    out.push_str(&content[at..]);
    Some(out)
}
