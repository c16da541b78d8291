use crate::cli::args::BackendFilter;
use crate::commands::Engine;
use crate::core::types::{Package, UpgradablePackage};
use crate::error::Result;
use crate::ui::{self as output, ConsoleObserver};
use crate::utils::machine_output::{self, OutputFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Listing<T: Serialize> {
    total: usize,
    packages: Vec<T>,
}

/// `unipkg list`: installed packages across enabled backends
pub fn run_installed(filter: &BackendFilter, format: OutputFormat) -> Result<()> {
    let engine = Engine::load(filter.backend)?;
    let observer = ConsoleObserver::new("list", false);
    let mut packages = engine.catalog.list_installed(&observer);
    sort_packages(&mut packages);
    engine.collections.add_installed(packages.iter().cloned());

    if format.is_machine() {
        return machine_output::emit_v1(
            "list",
            Listing {
                total: packages.len(),
                packages,
            },
            Vec::new(),
            Vec::new(),
            format,
        );
    }

    if packages.is_empty() {
        output::info("No installed packages found");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = packages
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.id.clone(),
                p.version.clone(),
                p.source.clone(),
                p.backend.to_string(),
            ]
        })
        .collect();
    output::table(&["Name", "Id", "Version", "Source", "Backend"], &rows);
    output::info(&format!("{} packages installed", packages.len()));
    Ok(())
}

/// `unipkg updates`: packages with a newer version available
pub fn run_updates(filter: &BackendFilter, format: OutputFormat) -> Result<()> {
    let engine = Engine::load(filter.backend)?;
    let observer = ConsoleObserver::new("updates", false);
    let mut updates = engine.catalog.list_updates(&observer);
    updates.sort_by(|a, b| compare(&a.package, &b.package));
    engine.collections.add_updates(updates.iter().cloned());

    if format.is_machine() {
        return machine_output::emit_v1(
            "updates",
            Listing {
                total: updates.len(),
                packages: updates,
            },
            Vec::new(),
            Vec::new(),
            format,
        );
    }

    if updates.is_empty() {
        output::success("Everything is up to date");
        return Ok(());
    }

    output::table(
        &["Name", "Id", "Version", "Available", "Backend"],
        &update_rows(&updates),
    );
    output::info(&format!("{} updates available", updates.len()));
    Ok(())
}

fn update_rows(updates: &[UpgradablePackage]) -> Vec<Vec<String>> {
    updates
        .iter()
        .map(|u| {
            vec![
                u.package.name.clone(),
                u.package.id.clone(),
                u.package.version.clone(),
                u.new_version.clone(),
                u.package.backend.to_string(),
            ]
        })
        .collect()
}

fn compare(a: &Package, b: &Package) -> std::cmp::Ordering {
    a.backend
        .key()
        .cmp(b.backend.key())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Backend first, then case-insensitive name.
pub(crate) fn sort_packages(packages: &mut [Package]) {
    packages.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Backend;

    #[test]
    fn packages_sort_by_backend_then_name() {
        let mut packages = vec![
            Package::new("zlib", "zlib", "1.0", "main", Backend::Scoop),
            Package::new("black", "black", "24.1", "PyPi", Backend::Pip),
            Package::new("Git", "Git.Git", "2.43", "winget", Backend::Scoop),
        ];
        sort_packages(&mut packages);
        let ids: Vec<&str> = packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["black", "Git.Git", "zlib"]);
    }

    #[test]
    fn update_rows_show_both_versions() {
        let pkg = Package::new("Node.js", "OpenJS.NodeJS", "20.1.0", "winget", Backend::Winget);
        let rows = update_rows(&[UpgradablePackage::new(pkg, "20.2.0")]);
        assert_eq!(rows[0][2], "20.1.0");
        assert_eq!(rows[0][3], "20.2.0");
        assert_eq!(rows[0][4], "Winget");
    }
}
