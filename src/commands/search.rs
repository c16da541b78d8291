//! Package search and details
//!
//! Every enabled backend is queried in parallel. A backend that is missing
//! or fails shows up as a warning and contributes no results.

use crate::commands::Engine;
use crate::commands::list::sort_packages;
use crate::core::types::{Backend, Package, PackageDetails};
use crate::error::Result;
use crate::traits::NullObserver;
use crate::ui::{self as output, ConsoleObserver};
use crate::utils::machine_output::{self, OutputFormat};
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SearchReport {
    query: String,
    total: usize,
    packages: Vec<Package>,
}

pub struct SearchOptions {
    pub query: String,
    pub backend: Option<Backend>,
    pub format: OutputFormat,
}

/// `unipkg search`
pub fn run(options: SearchOptions) -> Result<()> {
    let engine = Engine::load(options.backend)?;
    let observer = ConsoleObserver::new("search", false);
    let mut packages = engine.catalog.search(&options.query, &observer);
    sort_packages(&mut packages);
    engine.collections.add_discovered(packages.iter().cloned());

    if options.format.is_machine() {
        return machine_output::emit_v1(
            "search",
            SearchReport {
                query: options.query,
                total: packages.len(),
                packages,
            },
            Vec::new(),
            Vec::new(),
            options.format,
        );
    }

    if packages.is_empty() {
        output::info(&format!("No packages found matching '{}'", options.query));
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
    output::info(&format!("{} packages found", packages.len()));
    Ok(())
}

pub struct ShowOptions {
    pub id: String,
    pub backend: Backend,
    pub fetch_size: bool,
    pub format: OutputFormat,
}

/// `unipkg show`: details for one package
pub fn run_show(options: ShowOptions) -> Result<()> {
    let engine = Engine::load(Some(options.backend))?;
    let package = engine
        .catalog
        .search(&options.id, &NullObserver)
        .into_iter()
        .find(|p| p.id.eq_ignore_ascii_case(&options.id))
        .unwrap_or_else(|| Package::new(&options.id, &options.id, "", options.backend.display_name(), options.backend));

    let details = engine.catalog.details(&package, options.fetch_size)?;
    let capabilities = engine.catalog.manager(options.backend)?.capabilities().labels();

    if options.format.is_machine() {
        return machine_output::emit_v1("show", details, Vec::new(), Vec::new(), options.format);
    }

    print_details(&details, &capabilities);
    Ok(())
}

fn print_details(details: &PackageDetails, capabilities: &[&str]) {
    let package = &details.package;
    output::header(&format!("{} ({})", package.name, package.id));
    output::keyval("Backend", &package.backend.to_string());
    if !package.source.is_empty() {
        output::keyval("Source", &package.source);
    }
    if !package.version.is_empty() {
        output::keyval("Version", &package.version);
    }
    if !capabilities.is_empty() {
        output::keyval("Supports", &capabilities.join(", "));
    }
    output::keyval("Publisher", &details.publisher.to_string());
    output::keyval("Author", &details.author.to_string());
    output::keyval("Homepage", &details.homepage_url.to_string());
    output::keyval("License", &details.license.to_string());
    output::keyval("License URL", &details.license_url.to_string());
    output::keyval("Installer URL", &details.installer_url.to_string());
    output::keyval("Installer hash", &details.installer_hash.to_string());
    output::keyval("Installer type", &details.installer_type.to_string());
    let size = match details.installer_size.as_known() {
        Some(mb) => format!("{} MB", mb),
        None => details.installer_size.to_string(),
    };
    output::keyval("Installer size", &size);
    output::keyval("Manifest", &details.manifest_url.to_string());
    output::keyval("Updated", &details.update_date.to_string());
    output::keyval("Release notes URL", &details.release_notes_url.to_string());

    for (label, values) in [
        ("Versions", &details.versions),
        ("Architectures", &details.architectures),
        ("Scopes", &details.scopes),
        ("Tags", &details.tags),
    ] {
        if !values.is_empty() {
            output::keyval(label, &values.join(", "));
        }
    }

    println!();
    println!("{}", "Description".bold());
    output::indent(&details.description.to_string(), 1);
    if let Some(notes) = details.release_notes.as_known() {
        println!();
        println!("{}", "Release notes".bold());
        for line in notes.lines() {
            output::indent(line, 1);
        }
    }
}
