//! Package collections shown to the user: installed, has-update and discovered.
//!
//! Listings merge into these incrementally, one backend at a time. A finished
//! operation moves its package between collections via [`PackageCollections::apply_success`].

use crate::core::types::{OperationKind, Package, PackageKey, UpgradablePackage};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct PackageCollections {
    installed: Mutex<BTreeMap<PackageKey, Package>>,
    updates: Mutex<BTreeMap<PackageKey, UpgradablePackage>>,
    discovered: Mutex<BTreeMap<PackageKey, Package>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PackageCollections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_installed(&self, packages: impl IntoIterator<Item = Package>) {
        let mut installed = guard(&self.installed);
        for pkg in packages {
            installed.insert(pkg.key(), pkg);
        }
    }

    pub fn add_updates(&self, packages: impl IntoIterator<Item = UpgradablePackage>) {
        let mut updates = guard(&self.updates);
        for pkg in packages {
            updates.insert(pkg.key(), pkg);
        }
    }

    pub fn add_discovered(&self, packages: impl IntoIterator<Item = Package>) {
        let mut discovered = guard(&self.discovered);
        for pkg in packages {
            discovered.insert(pkg.key(), pkg);
        }
    }

    pub fn is_installed(&self, key: &PackageKey) -> bool {
        guard(&self.installed).contains_key(key)
    }

    pub fn has_update(&self, key: &PackageKey) -> bool {
        guard(&self.updates).contains_key(key)
    }

    pub fn installed(&self) -> Vec<Package> {
        guard(&self.installed).values().cloned().collect()
    }

    pub fn updates(&self) -> Vec<UpgradablePackage> {
        guard(&self.updates).values().cloned().collect()
    }

    pub fn discovered(&self) -> Vec<Package> {
        guard(&self.discovered).values().cloned().collect()
    }

    /// Record a successful operation on `package`.
    ///
    /// Installs add the package to "installed"; updates drop it from
    /// "has update" and bump the installed version; uninstalls drop it from both.
    pub fn apply_success(&self, kind: OperationKind, package: &Package, installed_version: Option<&str>) {
        let key = package.key();
        match kind {
            OperationKind::Install => {
                let mut pkg = package.clone();
                if let Some(version) = installed_version {
                    pkg.version = version.to_string();
                }
                guard(&self.installed).insert(key, pkg);
            }
            OperationKind::Update => {
                let removed = guard(&self.updates).remove(&key);
                let new_version = installed_version
                    .map(str::to_string)
                    .or_else(|| removed.map(|u| u.new_version));
                if let Some(version) = new_version
                    && let Some(existing) = guard(&self.installed).get_mut(&key)
                {
                    existing.version = version;
                }
            }
            OperationKind::Uninstall => {
                guard(&self.installed).remove(&key);
                guard(&self.updates).remove(&key);
            }
        }
    }

    pub fn clear(&self) {
        guard(&self.installed).clear();
        guard(&self.updates).clear();
        guard(&self.discovered).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Backend;

    fn pkg(id: &str, version: &str) -> Package {
        Package::new(id, id, version, "Winget: winget", Backend::Winget)
    }

    #[test]
    fn uninstall_removes_from_installed_and_updates() {
        let collections = PackageCollections::new();
        collections.add_installed([pkg("foo", "1.0"), pkg("bar", "2.0")]);
        collections.add_updates([UpgradablePackage::new(pkg("foo", "1.0"), "1.1")]);

        collections.apply_success(OperationKind::Uninstall, &pkg("foo", "1.0"), None);

        assert!(!collections.is_installed(&pkg("foo", "1.0").key()));
        assert!(!collections.has_update(&pkg("foo", "1.0").key()));
        assert!(collections.is_installed(&pkg("bar", "2.0").key()));
    }

    #[test]
    fn update_bumps_installed_version() {
        let collections = PackageCollections::new();
        collections.add_installed([pkg("foo", "1.0")]);
        collections.add_updates([UpgradablePackage::new(pkg("foo", "1.0"), "1.1")]);

        collections.apply_success(OperationKind::Update, &pkg("foo", "1.0"), None);

        assert!(collections.updates().is_empty());
        assert_eq!(collections.installed()[0].version, "1.1");
    }

    #[test]
    fn install_adds_with_requested_version() {
        let collections = PackageCollections::new();
        collections.apply_success(OperationKind::Install, &pkg("foo", "2.0"), Some("1.5"));
        assert_eq!(collections.installed()[0].version, "1.5");
    }
}
