//! Per-backend token blacklists
//!
//! Headers, footers and localized banners sometimes survive table parsing
//! as pseudo-rows ("The following packages have an upgrade available..."
//! yields id `have`). Any record whose name, id or version equals a listed
//! token is dropped. Every backend parser funnels its records through
//! [`Blacklist::filter`].

use crate::core::types::{Package, UpgradablePackage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blacklist {
    pub names: &'static [&'static str],
    pub ids: &'static [&'static str],
    pub versions: &'static [&'static str],
}

impl Blacklist {
    pub const EMPTY: Blacklist = Blacklist {
        names: &[],
        ids: &[],
        versions: &[],
    };

    /// Records with an empty id are never admitted, whatever the lists say.
    pub fn admits(&self, name: &str, id: &str, version: &str) -> bool {
        !id.is_empty()
            && !self.names.contains(&name)
            && !self.ids.contains(&id)
            && !self.versions.contains(&version)
    }

    pub fn admits_package(&self, pkg: &Package) -> bool {
        self.admits(&pkg.name, &pkg.id, &pkg.version)
    }

    /// An update also needs an admissible target version.
    pub fn admits_update(&self, update: &UpgradablePackage) -> bool {
        self.admits_package(&update.package) && !self.versions.contains(&update.new_version.as_str())
    }

    pub fn filter(&self, packages: Vec<Package>) -> Vec<Package> {
        packages
            .into_iter()
            .filter(|p| {
                let ok = self.admits_package(p);
                if !ok {
                    tracing::debug!(name = %p.name, id = %p.id, version = %p.version, "dropped blacklisted row");
                }
                ok
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Backend;

    const LIST: Blacklist = Blacklist {
        names: &["Did"],
        ids: &["have", "the"],
        versions: &["Version"],
    };

    #[test]
    fn test_filters_each_field() {
        let pkgs = vec![
            Package::new("Did", "x", "1", "s", Backend::Winget),
            Package::new("ok", "have", "1", "s", Backend::Winget),
            Package::new("ok", "y", "Version", "s", Backend::Winget),
            Package::new("ok", "", "1", "s", Backend::Winget),
            Package::new("Keep", "keep", "1", "s", Backend::Winget),
        ];
        let kept = LIST.filter(pkgs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "keep");
    }

    #[test]
    fn test_update_target_version_is_checked() {
        let pkg = Package::new("ok", "ok", "1", "s", Backend::Winget);
        assert!(LIST.admits_update(&UpgradablePackage::new(pkg.clone(), "2")));
        assert!(!LIST.admits_update(&UpgradablePackage::new(pkg, "Version")));
    }

    #[test]
    fn test_empty_list_still_drops_empty_ids() {
        assert!(!Blacklist::EMPTY.admits("n", "", "1"));
        assert!(Blacklist::EMPTY.admits("n", "i", ""));
    }
}
