//! Collaborator traits
//!
//! The engine renders nothing and stores no settings itself. It talks to
//! its host through these traits:
//! - `SettingsStore` for boolean/string key-value settings
//! - `ListingObserver` for incremental per-backend listing results
//! - `OperationObserver` for live output, progress and terminal results
//!
//! Depending on traits keeps the orchestrator testable with in-memory fakes.

use crate::core::types::{Backend, Package, PackageTag};
use crate::operations::orchestrator::OperationState;
use crate::operations::queue::Ticket;
use crate::operations::result::OperationOutcome;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Boolean/string key-value settings; the storage format is the implementor's business.
pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&self, key: &str, value: &str);

    fn get_bool(&self, key: &str) -> bool {
        self.get_string(key)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.set_string(key, if value { "true" } else { "false" });
    }
}

/// In-memory settings, used by tests and as a fallback when the settings file is unreadable.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.set_string(key, value);
        self
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_string(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

/// Receives listing results as each backend finishes; no cross-backend ordering.
pub trait ListingObserver: Send + Sync {
    fn on_packages(&self, backend: Backend, packages: &[Package]);

    /// Exactly one per backend per listing, also when the backend failed.
    fn on_backend_finished(&self, backend: Backend, count: usize);

    fn on_backend_error(&self, backend: Backend, message: &str) {
        tracing::warn!(%backend, message, "listing failed");
    }
}

/// Receives everything a running operation reports.
pub trait OperationObserver: Send + Sync {
    fn on_state(&self, _ticket: Ticket, _state: OperationState) {}

    fn on_output_line(&self, _ticket: Ticket, _line: &str) {}

    fn on_progress(&self, _ticket: Ticket, _percent: u8) {}

    fn on_finished(&self, ticket: Ticket, outcome: &OperationOutcome);

    fn on_tag(&self, _package: &Package, _tag: PackageTag) {}
}

/// Observer that drops everything.
pub struct NullObserver;

impl OperationObserver for NullObserver {
    fn on_finished(&self, _ticket: Ticket, _outcome: &OperationOutcome) {}
}

impl ListingObserver for NullObserver {
    fn on_packages(&self, _backend: Backend, _packages: &[Package]) {}

    fn on_backend_finished(&self, _backend: Backend, _count: usize) {}
}
