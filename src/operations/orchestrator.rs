//! # Operation orchestrator
//!
//! Drives one install/update/uninstall from its queue ticket to a terminal
//! state:
//!
//! ```text
//! Queued -> Starting -> Running -> {Succeeded, Failed, Cancelled} -> Closed
//!              ^           |
//!              +-----------+  recoverable result, bounded retries
//! ```
//!
//! Retries reuse the same ticket and thread a new [`InstallationOptions`]
//! value through the loop: first elevation, then the backend's scope flag.
//! A hash mismatch is never retried. Cancellation wins over everything.

use crate::constants::{MAX_OPERATION_RETRIES, settings_keys};
use crate::core::collections::PackageCollections;
use crate::core::options::InstallationOptions;
use crate::core::types::{OperationKind, Package, PackageTag};
use crate::operations::driver::{Driver, DriverEvent};
use crate::operations::oplog::{LogEntry, OperationLog};
use crate::operations::queue::{Scheduler, Ticket};
use crate::operations::result::{OperationOutcome, ResultCode};
use crate::packages::PackageManager;
use crate::traits::{OperationObserver, SettingsStore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    Queued,
    Starting,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Closed,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled | Self::Closed)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Queued => "queued",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Closed => "closed",
        };
        write!(f, "{}", text)
    }
}

/// Shared collaborators every operation talks to.
#[derive(Clone)]
pub struct OperationContext {
    pub scheduler: Arc<Scheduler>,
    pub settings: Arc<dyn SettingsStore>,
    pub collections: Arc<PackageCollections>,
    pub observer: Arc<dyn OperationObserver>,
    pub log: Option<OperationLog>,
}

/// Removes the ticket from the queue if `run` unwinds before `finish`.
struct TicketGuard<'a> {
    scheduler: &'a Scheduler,
    ticket: Ticket,
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.remove(self.ticket);
    }
}

/// Marks the process-wide "installing" flag while a driver runs.
struct RunningGuard<'a>(&'a Scheduler);

impl<'a> RunningGuard<'a> {
    fn new(scheduler: &'a Scheduler) -> Self {
        scheduler.begin_running();
        Self(scheduler)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.end_running();
    }
}

/// One queued operation.
pub struct Operation {
    context: OperationContext,
    manager: Arc<dyn PackageManager>,
    kind: OperationKind,
    package: Package,
    options: InstallationOptions,
    ticket: Ticket,
    state: OperationState,
    cancel: Arc<AtomicBool>,
    last_command: Option<String>,
}

impl Operation {
    /// Enqueue a ticket for `package` and tag it pending.
    pub fn enqueue(
        context: OperationContext,
        manager: Arc<dyn PackageManager>,
        kind: OperationKind,
        package: Package,
        options: InstallationOptions,
    ) -> Self {
        let ticket = context.scheduler.enqueue();
        let operation = Self {
            context,
            manager,
            kind,
            package,
            options,
            ticket,
            state: OperationState::Queued,
            cancel: Arc::new(AtomicBool::new(false)),
            last_command: None,
        };
        operation.context.observer.on_tag(&operation.package, PackageTag::Pending);
        operation.context.observer.on_state(ticket, OperationState::Queued);
        operation
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Options as of the last attempt
    pub fn options(&self) -> &InstallationOptions {
        &self.options
    }

    /// Flag that cancels this operation from any thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn set_state(&mut self, state: OperationState) {
        if self.state != state {
            tracing::debug!(ticket = %self.ticket, from = %self.state, to = %state, "operation state");
            self.state = state;
            self.context.observer.on_state(self.ticket, state);
        }
    }

    fn setting(&self, key: &str) -> bool {
        self.context.settings.get_bool(key)
    }

    /// Options for the attempt after a recoverable `code`, if any are left.
    fn next_options(&self, code: ResultCode) -> Option<InstallationOptions> {
        match code {
            ResultCode::NeedsElevation
                if self.manager.capabilities().can_run_as_admin && !self.options.run_as_admin =>
            {
                Some(self.options.elevated())
            }
            ResultCode::NeedsBackendScopeRetry => self.manager.scope_retry(&self.options),
            _ => None,
        }
    }

    fn prepare_elevation(&self, driver: &dyn Driver) {
        if self.options.run_as_admin
            && self.setting(settings_keys::DO_CACHE_ADMIN_RIGHTS)
            && self.context.scheduler.mark_admin_rights_cached()
            && let Err(e) = driver.cache_admin_rights()
        {
            tracing::warn!(error = %e, "could not cache administrator rights");
        }
    }

    /// Wait for the queue, run the driver with bounded retries and report the outcome.
    pub fn run(&mut self, driver: &dyn Driver) -> OperationOutcome {
        let context = self.context.clone();
        let _ticket = TicketGuard {
            scheduler: &context.scheduler,
            ticket: self.ticket,
        };

        if self.setting(&settings_keys::always_elevate(self.package.backend))
            && self.manager.capabilities().can_run_as_admin
        {
            self.options = self.options.elevated();
        }

        if !context.scheduler.wait_until_current(self.ticket, &self.cancel) {
            return self.finish(OperationOutcome::cancelled(String::new(), 0));
        }

        let mut attempts = 0;
        let mut retries = 0;
        let outcome = loop {
            if self.is_cancelled() {
                break OperationOutcome::cancelled(String::new(), attempts);
            }
            self.set_state(OperationState::Starting);
            context.observer.on_tag(&self.package, PackageTag::Processing);
            self.prepare_elevation(driver);

            attempts += 1;
            let ticket = self.ticket;
            let observer = Arc::clone(&context.observer);
            let mut spawned = false;
            let result = {
                let _running = RunningGuard::new(&context.scheduler);
                driver.run(self.kind, &self.package, &self.options, &self.cancel, &mut |event| match event {
                    DriverEvent::Spawned => {
                        spawned = true;
                        observer.on_state(ticket, OperationState::Running);
                    }
                    DriverEvent::Line(line) => observer.on_output_line(ticket, line),
                    DriverEvent::Progress(percent) => observer.on_progress(ticket, percent),
                })
            };
            if spawned {
                // Already reported to the observer from inside the driver
                self.state = OperationState::Running;
            }

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(ticket = %self.ticket, error = %e, "driver failed to run");
                    break OperationOutcome {
                        code: ResultCode::Failed,
                        exit_code: None,
                        output: e.to_string(),
                        cancelled: false,
                        attempts,
                    };
                }
            };
            self.last_command = Some(outcome.command.clone());

            if outcome.run.cancelled || self.is_cancelled() {
                break OperationOutcome::cancelled(outcome.run.output, attempts);
            }

            if outcome.code.is_recoverable()
                && retries < MAX_OPERATION_RETRIES
                && let Some(next) = self.next_options(outcome.code)
            {
                retries += 1;
                tracing::info!(
                    ticket = %self.ticket,
                    code = %outcome.code,
                    retry = retries,
                    "retrying operation with adjusted options"
                );
                self.options = next;
                continue;
            }

            break OperationOutcome {
                code: outcome.code,
                exit_code: outcome.run.exit_code,
                output: outcome.run.output,
                cancelled: false,
                attempts,
            };
        };

        self.finish(outcome)
    }

    fn finish(&mut self, outcome: OperationOutcome) -> OperationOutcome {
        // Let the next ticket start while this one reports
        self.context.scheduler.remove(self.ticket);
        let observer = Arc::clone(&self.context.observer);
        if outcome.cancelled {
            self.set_state(OperationState::Cancelled);
            observer.on_tag(&self.package, PackageTag::Default);
        } else if outcome.is_success() {
            let version = match self.kind {
                OperationKind::Install => self.options.version.as_deref(),
                _ => None,
            };
            self.context.collections.apply_success(self.kind, &self.package, version);
            self.set_state(OperationState::Succeeded);
            let tag = match self.kind {
                OperationKind::Uninstall => PackageTag::Default,
                _ => PackageTag::Installed,
            };
            observer.on_tag(&self.package, tag);
        } else {
            self.set_state(OperationState::Failed);
            observer.on_tag(&self.package, PackageTag::Failed);
        }

        if let Some(log) = &self.context.log {
            let entry = LogEntry {
                kind: self.kind,
                package: &self.package,
                command: self.last_command.as_deref(),
                outcome: &outcome,
            };
            if let Err(e) = log.append(&entry) {
                tracing::warn!(error = %e, "could not write operation log");
            }
        }

        observer.on_finished(self.ticket, &outcome);
        self.set_state(OperationState::Closed);
        outcome
    }
}
