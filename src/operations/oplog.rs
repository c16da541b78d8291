//! Append-only operation log
//!
//! Human-readable record of every finished operation, shown by `unipkg history`.
//! The engine only ever appends to it and never parses it back.

use crate::core::types::{OperationKind, Package};
use crate::error::{Result, UnipkgError};
use crate::operations::result::OperationOutcome;
use crate::utils::paths;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const OUTPUT_PREFIX: &str = "   | ";

#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
}

/// One finished operation.
pub struct LogEntry<'a> {
    pub kind: OperationKind,
    pub package: &'a Package,
    /// Last command line run, if any process was started
    pub command: Option<&'a str>,
    pub outcome: &'a OperationOutcome,
}

impl OperationLog {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(paths::operation_log_file()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> UnipkgError {
        UnipkgError::IoError {
            path: self.path.clone(),
            source,
        }
    }

    pub fn append(&self, entry: &LogEntry<'_>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(render_entry(entry).as_bytes())
            .map_err(|e| self.io_error(e))
    }

    /// Whole log; an absent file reads as empty.
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn render_entry(entry: &LogEntry<'_>) -> String {
    let outcome = entry.outcome;
    let mut text = format!(
        "[{}] {} {} ({}, {})\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        entry.kind,
        entry.package.id,
        entry.package.backend,
        entry.package.source
    );
    if let Some(command) = entry.command {
        text.push_str(&format!("   command: {}\n", command));
    }
    let exit = outcome
        .exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());
    text.push_str(&format!(
        "   result: {} (exit code {}, {} attempt(s))\n",
        outcome.summary(),
        exit,
        outcome.attempts
    ));
    for line in outcome.output.lines() {
        text.push_str(OUTPUT_PREFIX);
        text.push_str(line);
        text.push('\n');
    }
    text.push('\n');
    text
}
