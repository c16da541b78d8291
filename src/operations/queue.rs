//! Process-wide install queue
//!
//! One [`Scheduler`] is shared by every operation. Tickets are admitted in
//! strict FIFO order and only the head of the queue is "current", unless
//! parallel mode is on, in which case every queued ticket is current.
//! Promotion happens inline: removing a ticket wakes all waiters and the new
//! head sees itself as current on its next check.

use crate::constants::QUEUE_POLL_MILLIS;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Unique, monotonically increasing queue token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Ticket>,
    next: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    state: Mutex<QueueState>,
    changed: Condvar,
    parallel: AtomicBool,
    admin_rights_cached: AtomicBool,
    running: AtomicUsize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel(parallel: bool) -> Self {
        let scheduler = Self::new();
        scheduler.set_parallel(parallel);
        scheduler
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_parallel(&self, parallel: bool) {
        self.parallel.store(parallel, Ordering::SeqCst);
        self.changed.notify_all();
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel.load(Ordering::SeqCst)
    }

    /// Append a fresh ticket to the tail.
    pub fn enqueue(&self) -> Ticket {
        let mut state = self.lock();
        state.next += 1;
        let ticket = Ticket(state.next);
        state.pending.push_back(ticket);
        tracing::debug!(%ticket, queued = state.pending.len(), "ticket enqueued");
        ticket
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        let state = self.lock();
        Self::current_in(&state, ticket, self.is_parallel())
    }

    fn current_in(state: &QueueState, ticket: Ticket, parallel: bool) -> bool {
        if parallel {
            state.pending.contains(&ticket)
        } else {
            state.pending.front() == Some(&ticket)
        }
    }

    /// Head of the queue
    pub fn current(&self) -> Option<Ticket> {
        self.lock().pending.front().copied()
    }

    pub fn contains(&self, ticket: Ticket) -> bool {
        self.lock().pending.contains(&ticket)
    }

    /// Zero-based position, `None` once removed.
    pub fn position(&self, ticket: Ticket) -> Option<usize> {
        self.lock().pending.iter().position(|t| *t == ticket)
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove `ticket` from any position. Returns whether it was queued.
    pub fn remove(&self, ticket: Ticket) -> bool {
        let mut state = self.lock();
        let Some(index) = state.pending.iter().position(|t| *t == ticket) else {
            return false;
        };
        state.pending.remove(index);
        drop(state);
        tracing::debug!(%ticket, "ticket removed");
        self.changed.notify_all();
        true
    }

    /// Block until `ticket` is current.
    ///
    /// Returns `false` when `cancel` was set or the ticket left the queue first.
    pub fn wait_until_current(&self, ticket: Ticket, cancel: &AtomicBool) -> bool {
        let poll = Duration::from_millis(QUEUE_POLL_MILLIS);
        let mut state = self.lock();
        loop {
            if cancel.load(Ordering::SeqCst) || !state.pending.contains(&ticket) {
                return false;
            }
            if Self::current_in(&state, ticket, self.is_parallel()) {
                return true;
            }
            state = match self.changed.wait_timeout(state, poll) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    // --- process-wide status flags ---------------------------------------

    pub fn admin_rights_cached(&self) -> bool {
        self.admin_rights_cached.load(Ordering::SeqCst)
    }

    /// Set the cached-admin-rights flag; `true` only for the first caller.
    pub fn mark_admin_rights_cached(&self) -> bool {
        !self.admin_rights_cached.swap(true, Ordering::SeqCst)
    }

    /// Whether any operation is currently running its process.
    pub fn is_installing(&self) -> bool {
        self.running.load(Ordering::SeqCst) > 0
    }

    pub(crate) fn begin_running(&self) {
        self.running.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn end_running(&self) {
        let _ = self
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}
