//! Listings across every enabled backend
//!
//! Each backend runs on its own rayon worker; results reach the
//! [`ListingObserver`] as soon as that backend finishes, with exactly one
//! `on_backend_finished` per backend. A missing executable or a failing
//! command yields an empty result for that backend, never an error.
//!
//! Backends with a catalog command (Chocolatey) search their cache file
//! instead of the network.

use crate::backends::cache::{CacheEntry, CacheFile};
use crate::core::types::{Backend, OperationKind, Package, PackageDetails, UpgradablePackage};
use crate::error::{Result, UnipkgError};
use crate::packages::registry::BackendRegistry;
use crate::packages::traits::{CommandRunner, PackageManager};
use crate::traits::{ListingObserver, SettingsStore};
use crate::utils::remote;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Anything a listing yields that carries a package.
pub trait Listed: Send {
    fn package(&self) -> &Package;
}

impl Listed for Package {
    fn package(&self) -> &Package {
        self
    }
}

impl Listed for UpgradablePackage {
    fn package(&self) -> &Package {
        &self.package
    }
}

pub struct Catalog {
    managers: Vec<Arc<dyn PackageManager>>,
    runner: Arc<dyn CommandRunner>,
    /// Overrides the per-user cache directory
    cache_dir: Option<PathBuf>,
}

impl Catalog {
    pub fn new(managers: Vec<Arc<dyn PackageManager>>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            managers,
            runner,
            cache_dir: None,
        }
    }

    /// Managers for every registered backend not disabled in `settings`.
    pub fn from_registry(
        registry: &BackendRegistry,
        settings: &dyn SettingsStore,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let managers = registry
            .enabled_backends(settings)
            .into_iter()
            .map(|b| registry.create_manager(b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(managers, runner))
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Keep only the given backend.
    pub fn only(mut self, backend: Backend) -> Self {
        self.managers.retain(|m| m.backend_type() == backend);
        self
    }

    pub fn backends(&self) -> Vec<Backend> {
        self.managers.iter().map(|m| m.backend_type()).collect()
    }

    pub fn manager(&self, backend: Backend) -> Result<Arc<dyn PackageManager>> {
        self.managers
            .iter()
            .find(|m| m.backend_type() == backend)
            .cloned()
            .ok_or_else(|| UnipkgError::UnknownBackend(backend.to_string()))
    }

    pub fn list_installed(&self, observer: &dyn ListingObserver) -> Vec<Package> {
        self.fan_out(observer, |manager| manager.list_installed(self.runner.as_ref()))
    }

    pub fn list_updates(&self, observer: &dyn ListingObserver) -> Vec<UpgradablePackage> {
        self.fan_out(observer, |manager| manager.list_updates(self.runner.as_ref()))
    }

    pub fn search(&self, query: &str, observer: &dyn ListingObserver) -> Vec<Package> {
        self.fan_out(observer, |manager| {
            if manager.catalog_command().is_some() {
                self.search_cached(manager, query)
            } else {
                manager.search(self.runner.as_ref(), query)
            }
        })
    }

    /// Details for one package, with the installer size looked up when requested.
    /// Replace a truncated id with the one the backend reports when asked again.
    pub fn complete_identity(&self, kind: OperationKind, package: Package) -> Package {
        match self.manager(package.backend) {
            Ok(manager) => manager.complete_identity(self.runner.as_ref(), kind, package),
            Err(_) => package,
        }
    }

    pub fn details(&self, package: &Package, fetch_size: bool) -> Result<PackageDetails> {
        let manager = self.manager(package.backend)?;
        let mut details = manager.details(self.runner.as_ref(), package)?;
        if fetch_size {
            remote::fill_installer_size(&mut details);
        }
        Ok(details)
    }

    fn cache_file(&self, backend: Backend) -> Result<CacheFile> {
        match &self.cache_dir {
            Some(dir) => Ok(CacheFile::at(dir.join(format!("{}CachedPackages", backend.key())))),
            None => CacheFile::for_backend(backend),
        }
    }

    fn search_cached(&self, manager: &Arc<dyn PackageManager>, query: &str) -> Result<Vec<Package>> {
        let backend = manager.backend_type();
        let cache = self.cache_file(backend)?;
        let scanner = Arc::clone(manager);
        let runner = Arc::clone(&self.runner);
        let entries = cache.load_or_scan(move || {
            let packages = scanner.scan_catalog(runner.as_ref())?;
            Ok(packages.iter().map(CacheEntry::from_package).collect())
        })?;

        let needle = query.to_lowercase();
        Ok(entries
            .iter()
            .filter(|e| e.id.to_lowercase().contains(&needle) || e.name.to_lowercase().contains(&needle))
            .map(|e| e.to_package(backend, backend.display_name()))
            .collect())
    }

    fn fan_out<T, F>(&self, observer: &dyn ListingObserver, list: F) -> Vec<T>
    where
        T: Listed,
        F: Fn(&Arc<dyn PackageManager>) -> Result<Vec<T>> + Sync,
    {
        self.managers
            .par_iter()
            .map(|manager| {
                let backend = manager.backend_type();
                let items = match list(manager) {
                    Ok(items) => items,
                    Err(UnipkgError::ExecutableMissing(exe)) => {
                        tracing::warn!(%backend, executable = %exe, "backend not installed");
                        observer.on_backend_error(backend, &format!("{} is not installed", exe));
                        Vec::new()
                    }
                    Err(e) => {
                        tracing::warn!(%backend, error = %e, "listing failed");
                        observer.on_backend_error(backend, &e.to_string());
                        Vec::new()
                    }
                };
                let packages: Vec<Package> = items.iter().map(|i| i.package().clone()).collect();
                if !packages.is_empty() {
                    observer.on_packages(backend, &packages);
                }
                observer.on_backend_finished(backend, items.len());
                items
            })
            .collect::<Vec<Vec<T>>>()
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::choco::ChocolateyManager;
    use crate::packages::pip::PipManager;
    use crate::packages::scoop::ScoopManager;
    use crate::traits::MemorySettings;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Canned {
        outputs: HashMap<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl CommandRunner for Canned {
        fn run(&self, program: &str, _args: &[String]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outputs
                .get(program)
                .map(|s| s.to_string())
                .ok_or_else(|| UnipkgError::ExecutableMissing(program.to_string()))
        }
    }

    #[derive(Default)]
    struct Collect {
        packages: Mutex<Vec<(Backend, usize)>>,
        finished: Mutex<Vec<(Backend, usize)>>,
        errors: Mutex<Vec<Backend>>,
    }

    impl ListingObserver for Collect {
        fn on_packages(&self, backend: Backend, packages: &[Package]) {
            self.packages.lock().unwrap().push((backend, packages.len()));
        }

        fn on_backend_finished(&self, backend: Backend, count: usize) {
            self.finished.lock().unwrap().push((backend, count));
        }

        fn on_backend_error(&self, backend: Backend, _message: &str) {
            self.errors.lock().unwrap().push(backend);
        }
    }

    const PIP_LIST: &str = "Package    Version\n---------- -------\npip        23.2.1\nrequests   2.31.0\n";
    const CHOCO_SEARCH: &str = "Chocolatey v2.2.2\n7zip 23.1.0\ngit 2.43.0\ngit.install 2.43.0\n3 packages found.\n";

    fn canned(outputs: &[(&'static str, &'static str)]) -> Arc<Canned> {
        Arc::new(Canned {
            outputs: outputs.iter().copied().collect(),
            ..Default::default()
        })
    }

    #[test]
    fn missing_backend_is_empty_and_reported() {
        let runner = canned(&[("pip", PIP_LIST)]);
        let catalog = Catalog::new(
            vec![Arc::new(PipManager::new()), Arc::new(ScoopManager::new())],
            runner,
        );
        let observer = Collect::default();

        let installed = catalog.list_installed(&observer);

        assert_eq!(installed.len(), 2);
        assert!(installed.iter().all(|p| p.backend == Backend::Pip));
        assert_eq!(*observer.errors.lock().unwrap(), vec![Backend::Scoop]);
        let mut finished = observer.finished.lock().unwrap().clone();
        finished.sort();
        assert_eq!(finished, vec![(Backend::Scoop, 0), (Backend::Pip, 2)]);
        assert_eq!(*observer.packages.lock().unwrap(), vec![(Backend::Pip, 2)]);
    }

    #[test]
    fn cached_search_scans_cold_cache_once() {
        let dir = tempdir().unwrap();
        let runner = canned(&[("choco", CHOCO_SEARCH)]);
        let catalog = Catalog::new(vec![Arc::new(ChocolateyManager::new())], runner.clone())
            .with_cache_dir(dir.path());
        let observer = Collect::default();

        let found = catalog.search("GIT", &observer);

        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["git", "git.install"]);
        assert!(found.iter().all(|p| p.source == "Chocolatey"));
        assert!(dir.path().join("ChocolateyCachedPackages").exists());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_backends_are_not_listed() {
        let settings = MemorySettings::new().with("DisablePip", "true");
        let runner = canned(&[]);
        let catalog = Catalog::from_registry(&BackendRegistry::default(), &settings, runner).unwrap();
        assert!(!catalog.backends().contains(&Backend::Pip));
        assert!(catalog.backends().contains(&Backend::Npm));
        assert!(catalog.manager(Backend::Pip).is_err());
    }

    #[test]
    fn only_keeps_one_backend() {
        let catalog = Catalog::from_registry(&BackendRegistry::default(), &MemorySettings::new(), canned(&[]))
            .unwrap()
            .only(Backend::Scoop);
        assert_eq!(catalog.backends(), vec![Backend::Scoop]);
    }
}
