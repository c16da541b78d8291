//! Console rendering of engine events

use crate::core::types::{Backend, Package, PackageTag};
use crate::operations::orchestrator::OperationState;
use crate::operations::queue::Ticket;
use crate::operations::result::{OperationOutcome, ResultCode};
use crate::traits::{ListingObserver, OperationObserver};
use crate::ui::{self, progress::ProgressBar};
use colored::Colorize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Prints operation progress and listing errors to the terminal.
///
/// With `show_output` every console line of the backend is echoed;
/// otherwise a progress bar stands in for it.
pub struct ConsoleObserver {
    label: String,
    show_output: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new(label: &str, show_output: bool) -> Self {
        Self {
            label: label.to_string(),
            show_output,
            bar: Mutex::new(None),
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OperationObserver for ConsoleObserver {
    fn on_state(&self, ticket: Ticket, state: OperationState) {
        tracing::debug!(%ticket, %state, "operation state");
        if ui::is_quiet() {
            return;
        }
        match state {
            OperationState::Queued => ui::info(&format!("{} queued", self.label)),
            OperationState::Starting if !self.show_output => {
                let mut bar = self.bar();
                if bar.is_none() {
                    *bar = Some(ProgressBar::percent(&self.label));
                }
            }
            _ => {}
        }
    }

    fn on_output_line(&self, _ticket: Ticket, line: &str) {
        if self.show_output && !ui::is_quiet() {
            println!("   {} {}", "|".bright_black(), line);
        }
    }

    fn on_progress(&self, _ticket: Ticket, percent: u8) {
        if let Some(bar) = self.bar().as_mut() {
            bar.set(percent as usize);
        }
    }

    fn on_finished(&self, _ticket: Ticket, outcome: &OperationOutcome) {
        if let Some(mut bar) = self.bar().take() {
            if outcome.is_success() {
                bar.finish();
            } else {
                bar.abandon();
            }
        }

        if outcome.cancelled {
            ui::warning(&format!("{}: cancelled", self.label));
        } else if outcome.is_success() {
            ui::success(&format!("{}: {}", self.label, outcome.summary()));
        } else {
            ui::error(&format!("{}: {}", self.label, outcome.summary()));
            if outcome.code != ResultCode::IncorrectHash && !self.show_output && !outcome.output.is_empty() {
                for line in outcome.output.lines() {
                    eprintln!("   {} {}", "|".bright_black(), line);
                }
            }
        }
    }

    fn on_tag(&self, package: &Package, tag: PackageTag) {
        tracing::debug!(id = %package.id, ?tag, "package tag");
    }
}

impl ListingObserver for ConsoleObserver {
    fn on_packages(&self, backend: Backend, packages: &[Package]) {
        tracing::debug!(%backend, count = packages.len(), "packages received");
    }

    fn on_backend_finished(&self, backend: Backend, count: usize) {
        tracing::debug!(%backend, count, "backend finished");
    }

    fn on_backend_error(&self, backend: Backend, message: &str) {
        tracing::warn!(%backend, message, "listing failed");
        if !ui::is_quiet() {
            ui::warning(&format!("{}: {}", backend, message));
        }
    }
}
