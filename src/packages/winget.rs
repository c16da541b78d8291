//! winget backend
//!
//! winget prints fixed-width tables with spinner frames in front of the
//! header, so listings use the column-position strategy. The Microsoft Store
//! backend (`msstore.rs`) is this same manager pinned to `--source msstore`.

use crate::backends::parsers::{Blacklist, TableSpec, field, parse_table, rows_after_rule, scan_fields};
use crate::core::capabilities::Capabilities;
use crate::core::identity::{is_truncated, untruncated};
use crate::core::options::InstallationOptions;
use crate::core::types::{
    Backend, Detail, OperationKind, Package, PackageDetails, Scope, UpgradablePackage,
};
use crate::operations::result::ResultCode;
use crate::packages::traits::{CommandRunner, PackageManager, strings};

pub const HASH_MISMATCH_EXIT: i32 = 0x8A15_0011_u32 as i32;
pub const RESTART_REQUIRED_EXIT: i32 = 0x8A15_0109_u32 as i32;

const TABLE: TableSpec<'static> = TableSpec {
    header_marker: " Id ",
    end_marker: Some(" upgrades available."),
};

pub(crate) const WINGET_BLACKLIST: Blacklist = Blacklist {
    names: &[""],
    ids: &["", "have", "the", "Id"],
    versions: &["have", "an", "'winget", "pin'", "Version"],
};

const DETAIL_KEYS: &[&str] = &[
    "Publisher",
    "Author",
    "Description",
    "Homepage",
    "License Url",
    "License",
    "Installer SHA256",
    "Installer Url",
    "Installer Type",
    "Release Date",
    "Release Notes Url",
    "Release Notes",
    "Tags",
];

pub struct WingetManager {
    backend: Backend,
    /// `--source` pinned on every command
    source: Option<&'static str>,
}

impl WingetManager {
    pub fn new() -> Self {
        Self {
            backend: Backend::Winget,
            source: None,
        }
    }

    pub(crate) fn pinned(backend: Backend, source: &'static str) -> Self {
        Self {
            backend,
            source: Some(source),
        }
    }

    fn source_args(&self) -> Vec<String> {
        match self.source {
            Some(src) => strings(&["--source", src]),
            None => Vec::new(),
        }
    }

    fn source_label(&self, column: &str) -> String {
        match (self.backend, column.trim()) {
            (Backend::MsStore, _) => "Microsoft Store".to_string(),
            (_, "") => "Winget".to_string(),
            (_, src) => format!("Winget: {}", src),
        }
    }

    /// `--id <id> --exact`, or `--name <name>` when the id was cut short.
    fn target_args(package: &Package) -> Vec<String> {
        if is_truncated(&package.id) {
            strings(&["--name", untruncated(&package.name)])
        } else {
            strings(&["--id", &package.id, "--exact"])
        }
    }

    fn cell<'a>(cells: &'a [String], idx: Option<usize>) -> &'a str {
        idx.and_then(|i| cells.get(i)).map(String::as_str).unwrap_or("")
    }
}

impl Default for WingetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for WingetManager {
    fn backend_type(&self) -> Backend {
        self.backend
    }

    fn executable(&self) -> &'static str {
        "winget"
    }

    fn capabilities(&self) -> Capabilities {
        match self.backend {
            Backend::MsStore => Capabilities {
                can_run_as_admin: true,
                can_run_interactively: true,
                supports_custom_scopes: true,
                ..Capabilities::NONE
            },
            _ => Capabilities {
                can_run_as_admin: true,
                can_skip_integrity_checks: true,
                can_run_interactively: true,
                supports_custom_versions: true,
                supports_custom_architectures: true,
                supports_custom_scopes: true,
                ..Capabilities::NONE
            },
        }
    }

    fn blacklist(&self) -> Blacklist {
        WINGET_BLACKLIST
    }

    fn parse_packages(&self, output: &str) -> Vec<Package> {
        parse_table(output, TABLE)
            .into_iter()
            .map(|(layout, cells)| {
                let source_idx = layout.index_of("Source", layout.len() - 1).filter(|i| *i > 2);
                Package::new(
                    cells[0].clone(),
                    cells[1].clone(),
                    cells.get(2).cloned().unwrap_or_default(),
                    self.source_label(Self::cell(&cells, source_idx)),
                    self.backend,
                )
            })
            .collect()
    }

    fn parse_installed(&self, output: &str) -> Vec<Package> {
        parse_table(output, TABLE)
            .into_iter()
            .map(|(layout, cells)| {
                let source_idx = layout.index_of("Source", 4).filter(|i| *i > 2);
                Package::new(
                    cells[0].clone(),
                    cells[1].clone(),
                    cells.get(2).cloned().unwrap_or_default(),
                    self.source_label(Self::cell(&cells, source_idx)),
                    self.backend,
                )
            })
            .collect()
    }

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage> {
        parse_table(output, TABLE)
            .into_iter()
            .filter_map(|(layout, cells)| {
                let available_idx = layout.index_of("Available", 3).filter(|i| *i > 2);
                let source_idx = layout.index_of("Source", 4).filter(|i| *i > 3);
                let available = Self::cell(&cells, available_idx);
                if available.is_empty() {
                    tracing::debug!(id = %cells[1], "upgrade row without available version, skipped");
                    return None;
                }
                let pkg = Package::new(
                    cells[0].clone(),
                    cells[1].clone(),
                    cells.get(2).cloned().unwrap_or_default(),
                    self.source_label(Self::cell(&cells, source_idx)),
                    self.backend,
                );
                Some(UpgradablePackage::new(pkg, available))
            })
            .collect()
    }

    fn parse_details(&self, package: &Package, outputs: &[String]) -> PackageDetails {
        let mut details = PackageDetails::new(package.clone());
        details.scopes = strings(&["Current user", "Local machine"]);
        details.architectures = strings(&["x64", "x86", "arm64"]);
        details.manifest_url = Detail::Known(manifest_url(&package.id, self.backend));

        let Some(show) = outputs.first() else {
            return details;
        };
        if show.contains("No package found matching input criteria.") {
            return details;
        }

        let fields = scan_fields(show, DETAIL_KEYS);
        let text = |key: &str| field(&fields, key).map(|f| Detail::text(f.full_text())).unwrap_or_default();

        details.publisher = text("Publisher");
        details.author = text("Author");
        details.description = text("Description");
        details.homepage_url = text("Homepage");
        details.license = text("License");
        details.license_url = text("License Url");
        details.installer_hash = text("Installer SHA256");
        details.installer_url = text("Installer Url");
        details.installer_type = text("Installer Type");
        details.update_date = text("Release Date");
        details.release_notes_url = text("Release Notes Url");
        details.release_notes = text("Release Notes");
        if let Some(tags) = field(&fields, "Tags") {
            details.tags = tags.continuation.clone();
        }

        if let Some(versions) = outputs.get(1) {
            details.versions = rows_after_rule(versions)
                .into_iter()
                .map(|l| l.trim().to_string())
                .collect();
        }
        details
    }

    fn search_command(&self, query: &str) -> Vec<String> {
        let mut args = strings(&["search", query, "--accept-source-agreements"]);
        args.extend(self.source_args());
        args
    }

    fn installed_command(&self) -> Vec<String> {
        let mut args = strings(&["list", "--accept-source-agreements"]);
        args.extend(self.source_args());
        args
    }

    fn updates_command(&self) -> Vec<String> {
        let mut args = strings(&["upgrade", "--include-unknown", "--accept-source-agreements"]);
        args.extend(self.source_args());
        args
    }

    fn details_commands(&self, package: &Package) -> Vec<Vec<String>> {
        let mut show = strings(&["show", "--id", &package.id, "--exact", "--accept-source-agreements"]);
        show.extend(self.source_args());
        let mut versions = strings(&["show", "--id", &package.id, "--exact", "--versions", "--accept-source-agreements"]);
        versions.extend(self.source_args());
        vec![show, versions]
    }

    fn build_parameters(&self, kind: OperationKind, options: &InstallationOptions) -> Vec<String> {
        let caps = self.capabilities();
        let mut params = strings(&["--accept-source-agreements"]);

        if kind != OperationKind::Uninstall {
            if caps.supports_custom_architectures
                && let Some(arch) = &options.architecture
            {
                params.extend(strings(&["--architecture", arch]));
            }
            if caps.supports_custom_versions
                && let Some(version) = &options.version
            {
                params.extend(strings(&["--version", version, "--force"]));
            }
        }
        if let Some(scope) = options.scope {
            params.extend(strings(&[
                "--scope",
                match scope {
                    Scope::User => "user",
                    Scope::Machine => "machine",
                },
            ]));
        }
        if options.interactive {
            params.push("--interactive".to_string());
        } else {
            params.push("--disable-interactivity".to_string());
        }
        if options.skip_hash_check && caps.can_skip_integrity_checks && kind != OperationKind::Uninstall {
            params.push("--ignore-security-hash".to_string());
        }
        params.extend(options.custom_parameters.iter().cloned());
        params
    }

    fn complete_identity(&self, runner: &dyn CommandRunner, kind: OperationKind, package: Package) -> Package {
        if !is_truncated(&package.id) {
            return package;
        }
        let query = untruncated(&package.name);
        let (args, installed) = match kind {
            OperationKind::Install => (strings(&["search", "--name", query, "--accept-source-agreements"]), false),
            _ => (strings(&["list", "--query", query, "--accept-source-agreements"]), true),
        };
        let output = match runner.run(self.executable(), &args) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(id = %package.id, error = %e, "could not look up full winget id");
                return package;
            }
        };
        let candidates = if installed {
            self.parse_installed(&output)
        } else {
            self.parse_packages(&output)
        };

        let prefix = untruncated(&package.id);
        let found = candidates
            .into_iter()
            .filter(|p| !is_truncated(&p.id) && !p.id.is_empty())
            .find(|p| p.id.starts_with(prefix) && p.name.starts_with(query));
        match found {
            Some(full) => {
                tracing::debug!(from = %package.id, to = %full.id, "resolved truncated winget id");
                Package { id: full.id, ..package }
            }
            None => {
                tracing::debug!(id = %package.id, "full winget id not found, falling back to name");
                package
            }
        }
    }

    fn operation_args(&self, kind: OperationKind, package: &Package, _options: &InstallationOptions) -> Vec<String> {
        let target = Self::target_args(package);
        let mut args = match kind {
            OperationKind::Install => strings(&["install"]),
            OperationKind::Update => strings(&["upgrade"]),
            OperationKind::Uninstall => strings(&["uninstall"]),
        };
        args.extend(target);
        match kind {
            OperationKind::Install => args.push("--accept-package-agreements".to_string()),
            OperationKind::Update => args.extend(strings(&["--include-unknown", "--accept-package-agreements"])),
            OperationKind::Uninstall => {}
        }
        args.extend(self.source_args());
        args
    }

    fn classify(
        &self,
        kind: OperationKind,
        exit_code: Option<i32>,
        output: &str,
        _options: &InstallationOptions,
    ) -> ResultCode {
        if output.contains("No applicable upgrade found")
            || output.contains("No newer package versions are available")
        {
            return ResultCode::NoApplicableUpdateFound;
        }
        match exit_code {
            Some(0) => ResultCode::Succeeded,
            Some(HASH_MISMATCH_EXIT) => ResultCode::IncorrectHash,
            Some(RESTART_REQUIRED_EXIT) => ResultCode::NeedsRestart,
            _ if kind == OperationKind::Uninstall
                && (output.contains("1603") || output.contains("0x80070005") || output.contains("Access is denied")) =>
            {
                ResultCode::NeedsElevation
            }
            _ => ResultCode::Failed,
        }
    }

    fn progress_hint(&self, line: &str) -> Option<u8> {
        if line.contains("Successfully verified installer hash") {
            Some(50)
        } else if line.contains("Starting package install") || line.contains("Starting package uninstall") {
            Some(70)
        } else if line.contains("Successfully installed") || line.contains("Successfully uninstalled") {
            Some(100)
        } else if line.contains("Downloading ") {
            Some(20)
        } else {
            None
        }
    }
}

fn manifest_url(id: &str, backend: Backend) -> String {
    let is_store_id = backend == Backend::MsStore || (id == id.to_uppercase() && !id.contains('.'));
    if is_store_id {
        return format!("https://apps.microsoft.com/store/detail/{}", id);
    }
    let first = id.chars().next().map(|c| c.to_lowercase().to_string()).unwrap_or_default();
    format!(
        "https://github.com/microsoft/winget-pkgs/tree/master/manifests/{}/{}",
        first,
        id.replace('.', "/")
    )
}

#[cfg(test)]
mod tests;
