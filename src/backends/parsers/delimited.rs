//! Delimiter-split parsing
//!
//! Used when a backend (or our own cache file) prints a stable separator:
//! `choco outdated` uses `|`, npm and pip search use `|`, most list commands
//! are whitespace-separated after a dashed rule.

use super::columns::is_rule;
use crate::utils::sanitize::strip_control;

/// Split on `delim` and trim every field. Empty fields are kept so positions stay stable.
pub fn split_delimited(line: &str, delim: char) -> Vec<String> {
    line.split(delim).map(|f| f.trim().to_string()).collect()
}

/// Split on runs of whitespace.
pub fn split_spaces(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Cleaned, non-empty lines of `output`, with carriage-return frames collapsed.
pub fn clean_lines(output: &str) -> Vec<String> {
    strip_control(output)
        .split('\n')
        .map(|l| {
            l.trim_end_matches('\r')
                .rsplit('\r')
                .next()
                .unwrap_or("")
                .trim_end()
                .to_string()
        })
        .filter(|l| !l.trim().is_empty())
        .collect()
}

/// Lines after the first dashed rule (`----`), as printed by scoop, pip and dotnet.
pub fn rows_after_rule(output: &str) -> Vec<String> {
    let lines = clean_lines(output);
    match lines.iter().position(|l| is_rule(l) || l.trim_start().starts_with("----")) {
        Some(idx) => lines.into_iter().skip(idx + 1).filter(|l| !is_rule(l)).collect(),
        None => Vec::new(),
    }
}

/// Lines after the first line accepted by `is_header`.
pub fn rows_after_header<F>(output: &str, is_header: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let lines = clean_lines(output);
    match lines.iter().position(|l| is_header(l)) {
        Some(idx) => lines.into_iter().skip(idx + 1).collect(),
        None => Vec::new(),
    }
}
