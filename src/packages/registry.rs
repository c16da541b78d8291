//! # Package Manager Registry
//!
//! Maps each [`Backend`] to a factory producing its [`PackageManager`].
//! Callers dispatch through the registry instead of matching on backend
//! identity; backend-specific behaviour lives behind the trait and the
//! capability flags.
//!
//! ## Adding a New Backend
//!
//! 1. Create `src/packages/<backend>.rs` with a manager struct
//! 2. Implement `PackageManager`
//! 3. Add a `Backend::<Name>` variant to `core/types.rs`
//! 4. Register it in `BackendRegistry::register_defaults()`

use crate::constants::settings_keys;
use crate::core::types::Backend;
use crate::error::{Result, UnipkgError};
use crate::packages::PackageManager;
use crate::traits::SettingsStore;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Factory function for creating package manager instances
pub type BackendFactory = Box<dyn Fn() -> Arc<dyn PackageManager> + Send + Sync>;

pub struct BackendRegistry {
    factories: HashMap<Backend, BackendFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend with its factory function
    pub fn register<F>(&mut self, backend: Backend, factory: F)
    where
        F: Fn() -> Arc<dyn PackageManager> + Send + Sync + 'static,
    {
        self.factories.insert(backend, Box::new(factory));
    }

    pub fn create_manager(&self, backend: Backend) -> Result<Arc<dyn PackageManager>> {
        self.factories
            .get(&backend)
            .map(|factory| factory())
            .ok_or_else(|| UnipkgError::UnknownBackend(backend.to_string()))
    }

    /// Registered backends in [`Backend::ALL`] order
    pub fn registered_backends(&self) -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|b| self.factories.contains_key(b))
            .collect()
    }

    pub fn has_backend(&self, backend: Backend) -> bool {
        self.factories.contains_key(&backend)
    }

    /// Registered backends not switched off with `Disable<Backend>`
    pub fn enabled_backends(&self, settings: &dyn SettingsStore) -> Vec<Backend> {
        self.registered_backends()
            .into_iter()
            .filter(|b| !settings.get_bool(&settings_keys::disable(*b)))
            .collect()
    }

    /// Register all default backends
    pub fn register_defaults(&mut self) {
        self.register(Backend::Winget, || Arc::new(crate::packages::winget::WingetManager::new()));
        self.register(Backend::Scoop, || Arc::new(crate::packages::scoop::ScoopManager::new()));
        self.register(Backend::Chocolatey, || {
            Arc::new(crate::packages::choco::ChocolateyManager::new())
        });
        self.register(Backend::Dotnet, || Arc::new(crate::packages::dotnet::DotnetManager::new()));
        self.register(Backend::Npm, || Arc::new(crate::packages::npm::NpmManager::new()));
        self.register(Backend::Pip, || Arc::new(crate::packages::pip::PipManager::new()));
        self.register(Backend::MsStore, || Arc::new(crate::packages::msstore::store_manager()));
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }
}

static REGISTRY: OnceLock<BackendRegistry> = OnceLock::new();

/// Get the global backend registry
pub fn get_registry() -> &'static BackendRegistry {
    REGISTRY.get_or_init(BackendRegistry::default)
}

/// Create a package manager using the global registry
pub fn create_manager(backend: Backend) -> Result<Arc<dyn PackageManager>> {
    get_registry().create_manager(backend)
}
