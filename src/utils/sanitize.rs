//! Input validation and console-output cleanup
//!
//! Package ids typed by the user end up in argument vectors, never in a shell,
//! but they are still validated so a typo like `foo; bar` fails early.
//! Console output from backends carries ANSI colour codes, backspaces and
//! spinner frames, which are stripped before parsing.

use crate::error::{Result, UnipkgError};
use regex::Regex;
use std::sync::LazyLock;

/// Characters seen in ids across supported backends
/// (`Git.Git`, `@angular/cli`, `python-dateutil`, `9NBLGGH4NNS1`, `extras/vlc`)
static SAFE_PACKAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._+/-]+$").expect("Invalid regex pattern"));

/// CSI / OSC escape sequences
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07").expect("Invalid regex pattern")
});

/// Validate a package id before it is passed to a backend
pub fn validate_package_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(UnipkgError::ConfigError("Package id cannot be empty".to_string()));
    }

    if id.chars().count() > 256 {
        return Err(UnipkgError::ConfigError(format!(
            "Package id too long (max 256 chars): {}",
            id.chars().take(50).collect::<String>()
        )));
    }

    if !SAFE_PACKAGE_ID.is_match(id) {
        return Err(UnipkgError::ConfigError(format!(
            "Package id contains invalid characters: {}",
            id
        )));
    }

    Ok(())
}

/// Remove ANSI escape sequences and stray control characters, keeping `\r`, `\n` and `\t`.
pub fn strip_control(text: &str) -> String {
    ANSI_ESCAPE
        .replace_all(text, "")
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\r' | '\n' | '\t'))
        .collect()
}
