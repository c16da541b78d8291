//! Backend operation driver
//!
//! Turns (package, options, kind) into a running process, pushes its output
//! line by line and classifies the result through the backend.

use crate::backends::command_exec::{ProcessRun, resolve_executable, run_streaming};
use crate::backends::lines::ConsoleLine;
use crate::core::options::InstallationOptions;
use crate::core::types::{OperationKind, Package};
use crate::error::{Result, UnipkgError};
use crate::operations::result::ResultCode;
use crate::packages::PackageManager;
use crate::utils::platform;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// What a driver reports while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent<'a> {
    /// The child process is about to start
    Spawned,
    Line(&'a str),
    Progress(u8),
}

/// Result of one driver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutcome {
    pub code: ResultCode,
    pub run: ProcessRun,
    /// Command line as displayed in logs
    pub command: String,
}

pub trait Driver: Send + Sync {
    fn run(
        &self,
        kind: OperationKind,
        package: &Package,
        options: &InstallationOptions,
        cancel: &AtomicBool,
        events: &mut dyn FnMut(DriverEvent<'_>),
    ) -> Result<DriverOutcome>;

    /// Turn on the elevation helper's credential cache.
    fn cache_admin_rights(&self) -> Result<()> {
        Ok(())
    }
}

/// Coarse progress from line counts, for backends without recognizable milestones.
///
/// Percentages never go down and stay below 100 until the process ends.
#[derive(Debug, Default)]
pub struct LineProgress {
    lines: usize,
    last: u8,
}

const LINE_MILESTONES: &[(usize, u8)] = &[(1, 10), (5, 25), (15, 50), (30, 75), (60, 90)];

impl LineProgress {
    /// Feed one line; returns a new percentage when it moved forward.
    pub fn advance(&mut self, hint: Option<u8>) -> Option<u8> {
        self.lines += 1;
        let by_count = LINE_MILESTONES
            .iter()
            .rev()
            .find(|(count, _)| self.lines >= *count)
            .map(|(_, percent)| *percent)
            .unwrap_or(0);
        let next = hint.unwrap_or(by_count).min(100).max(self.last);
        (next > self.last).then(|| {
            self.last = next;
            next
        })
    }

    pub fn finish(&mut self) -> Option<u8> {
        (self.last < 100).then(|| {
            self.last = 100;
            100
        })
    }
}

/// Runs real processes for one backend.
pub struct ProcessDriver {
    manager: Arc<dyn PackageManager>,
}

impl ProcessDriver {
    pub fn new(manager: Arc<dyn PackageManager>) -> Self {
        Self { manager }
    }
}

impl Driver for ProcessDriver {
    fn run(
        &self,
        kind: OperationKind,
        package: &Package,
        options: &InstallationOptions,
        cancel: &AtomicBool,
        events: &mut dyn FnMut(DriverEvent<'_>),
    ) -> Result<DriverOutcome> {
        let command = self.manager.build_command(kind, package, options);
        let executable = resolve_executable(&command.program)?;
        let shown = command.display();
        tracing::debug!(command = %shown, path = %executable.display(), "starting operation");

        let mut progress = LineProgress::default();
        let manager = &self.manager;
        events(DriverEvent::Spawned);
        let run = run_streaming(&mut command.to_command(&executable), cancel, &mut |line: &ConsoleLine| {
            events(DriverEvent::Line(&line.text));
            if let Some(percent) = progress.advance(manager.progress_hint(&line.text)) {
                events(DriverEvent::Progress(percent));
            }
        })?;

        let code = self.manager.classify(kind, run.exit_code, &run.output, options);
        if code.is_success()
            && let Some(percent) = progress.finish()
        {
            events(DriverEvent::Progress(percent));
        }
        tracing::debug!(command = %shown, exit = ?run.exit_code, %code, "operation finished");
        Ok(DriverOutcome {
            code,
            run,
            command: shown,
        })
    }

    fn cache_admin_rights(&self) -> Result<()> {
        let mut cmd = platform::cache_admin_rights_command();
        let status = cmd.status().map_err(|e| UnipkgError::SystemCommandFailed {
            command: format!("{:?}", cmd),
            reason: e.to_string(),
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(UnipkgError::SystemCommandFailed {
                command: format!("{:?}", cmd),
                reason: format!("exited with {}", status),
            })
        }
    }
}
