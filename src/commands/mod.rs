//! Command handlers
//!
//! Every handler builds an [`Engine`] for the backends it needs, runs the
//! engine call and renders the result either as a table or as a v1 machine
//! envelope.

pub mod completions;
pub mod history;
pub mod list;
pub mod operate;
pub mod search;
pub mod settings;

use crate::config::Settings;
use crate::constants::{LISTING_TIMEOUT_SECS, settings_keys};
use crate::core::collections::PackageCollections;
use crate::core::types::Backend;
use crate::error::Result;
use crate::operations::{OperationLog, Scheduler};
use crate::packages::{Catalog, SystemRunner, get_registry};
use crate::traits::{MemorySettings, SettingsStore};
use crate::ui;
use crate::utils::paths;
use std::sync::Arc;
use std::time::Duration;

/// Shared collaborators for one CLI invocation.
pub struct Engine {
    pub settings: Arc<dyn SettingsStore>,
    pub scheduler: Arc<Scheduler>,
    pub catalog: Catalog,
    pub collections: Arc<PackageCollections>,
    pub log: Option<OperationLog>,
}

impl Engine {
    /// Engine over every enabled backend, or just `backend` when given.
    pub fn load(backend: Option<Backend>) -> Result<Self> {
        let settings = load_settings();
        let scheduler = Arc::new(Scheduler::with_parallel(
            settings.get_bool(settings_keys::ALLOW_PARALLEL_INSTALLS),
        ));

        let runner = Arc::new(SystemRunner {
            timeout: Duration::from_secs(LISTING_TIMEOUT_SECS),
        });
        let mut catalog = Catalog::from_registry(get_registry(), settings.as_ref(), runner)?
            .with_cache_dir(paths::cache_dir()?);
        if let Some(backend) = backend {
            catalog = catalog.only(backend);
        }

        let log = match OperationLog::open_default() {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::warn!(error = %e, "operation log unavailable");
                None
            }
        };

        Ok(Self {
            settings,
            scheduler,
            catalog,
            collections: Arc::new(PackageCollections::new()),
            log,
        })
    }
}

/// Settings from disk; an unreadable file falls back to defaults for this run.
fn load_settings() -> Arc<dyn SettingsStore> {
    match Settings::load() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            ui::warning(&format!("Ignoring settings file: {}", e));
            Arc::new(MemorySettings::new())
        }
    }
}
