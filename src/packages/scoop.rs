//! Scoop backend
//!
//! `scoop list` and `scoop status` print whitespace tables after a dashed
//! rule. Search output groups apps under `'bucket' bucket:` headers. Details
//! come from the JSON manifest printed by `scoop cat`.

use crate::backends::parsers::{Blacklist, clean_lines, rows_after_rule, split_spaces};
use crate::core::capabilities::Capabilities;
use crate::core::identity::format_id_as_name;
use crate::core::options::InstallationOptions;
use crate::core::types::{
    Backend, Detail, OperationKind, Package, PackageDetails, Scope, UpgradablePackage,
};
use crate::error::Result;
use crate::operations::result::ResultCode;
use crate::packages::traits::{CommandRunner, OperationCommand, PackageManager, strings};
use serde_json::Value;
use std::collections::HashMap;

const GLOBAL_PREFIX: &str = "Scoop (Global): ";
const USER_PREFIX: &str = "Scoop: ";

const SCOOP_BLACKLIST: Blacklist = Blacklist {
    names: &[],
    ids: &["No", "Name", "----"],
    versions: &["Matches", "Install", "failed", "failed,", "Manifest", "removed", "removed,"],
};

const KNOWN_BUCKETS: &[(&str, &str)] = &[
    ("main", "https://github.com/ScoopInstaller/Main"),
    ("extras", "https://github.com/ScoopInstaller/Extras"),
    ("versions", "https://github.com/ScoopInstaller/Versions"),
    ("nirsoft", "https://github.com/kodybrown/scoop-nirsoft"),
    ("sysinternals", "https://github.com/niheaven/scoop-sysinternals"),
    ("php", "https://github.com/ScoopInstaller/PHP"),
    ("nerd-fonts", "https://github.com/matthewjberger/scoop-nerd-fonts"),
    ("nonportable", "https://github.com/ScoopInstaller/Nonportable"),
    ("java", "https://github.com/ScoopInstaller/Java"),
    ("games", "https://github.com/Calinou/scoop-games"),
];

pub struct ScoopManager;

impl ScoopManager {
    pub fn new() -> Self {
        Self
    }

    /// Bucket name and whether the package is a global install.
    fn bucket_of(source: &str) -> (Option<&str>, bool) {
        if let Some(bucket) = source.strip_prefix(GLOBAL_PREFIX) {
            (Some(bucket), true)
        } else {
            (source.strip_prefix(USER_PREFIX), false)
        }
    }

    /// `bucket/id`, or the bare id when the bucket is unknown or a local path.
    fn qualified_id(package: &Package) -> String {
        match Self::bucket_of(&package.source).0 {
            Some(bucket) if !bucket.is_empty() && !bucket.contains(":\\") && !bucket.contains("...") => {
                format!("{}/{}", bucket, package.id)
            }
            _ => package.id.clone(),
        }
    }

    /// Global bucket, machine scope and admin runs all install with `--global`.
    fn wants_global(package: &Package, options: &InstallationOptions) -> bool {
        Self::bucket_of(&package.source).1 || options.scope == Some(Scope::Machine) || options.run_as_admin
    }
}

impl Default for ScoopManager {
    fn default() -> Self {
        Self::new()
    }
}

const SUCCESS_MARKERS: &[&str] = &[
    "was installed successfully",
    "was uninstalled",
    "was updated successfully",
    "is already installed",
];

const ADMIN_MARKERS: &[&str] = &[
    "requires admin rights",
    "requires administrator rights",
    "you need admin rights to install global apps",
];

/// Whether scoop told the user to retry with `-g`/`--global`.
fn mentions_global_flag(output: &str) -> bool {
    output
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .any(|token| token == "-g" || token == "--global")
}

/// Joins a manifest value that may be a string or a list of lines.
fn text_or_lines(value: Option<&Value>) -> Detail<String> {
    match value {
        Some(Value::Array(lines)) => Detail::text(
            lines
                .iter()
                .map(|l| l.as_str().map(str::to_string).unwrap_or_else(|| l.to_string()))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Some(Value::String(s)) => Detail::text(s.as_str()),
        Some(Value::Null) | None => Detail::Unknown,
        Some(other) => Detail::text(other.to_string()),
    }
}

fn first_string(value: Option<&Value>) -> Detail<String> {
    match value {
        Some(Value::Array(items)) => items
            .first()
            .and_then(Value::as_str)
            .map(Detail::text)
            .unwrap_or_default(),
        Some(Value::String(s)) => Detail::text(s.as_str()),
        _ => Detail::Unknown,
    }
}

fn author_from_homepage(homepage: &str) -> Option<String> {
    if let Some(rest) = homepage.strip_prefix("https://github.com/") {
        return rest.split('/').next().filter(|s| !s.is_empty()).map(str::to_string);
    }
    let host = homepage.split("://").nth(1)?.split('/').next()?;
    let labels: Vec<&str> = host.split('.').collect();
    (labels.len() >= 2).then(|| labels[labels.len() - 2].to_string())
}

impl PackageManager for ScoopManager {
    fn backend_type(&self) -> Backend {
        Backend::Scoop
    }

    fn executable(&self) -> &'static str {
        "scoop"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_run_as_admin: true,
            can_skip_integrity_checks: true,
            can_remove_data_on_uninstall: true,
            supports_custom_architectures: true,
            supports_custom_scopes: true,
            ..Capabilities::NONE
        }
    }

    fn blacklist(&self) -> Blacklist {
        SCOOP_BLACKLIST
    }

    fn parse_packages(&self, output: &str) -> Vec<Package> {
        let mut packages = Vec::new();
        let mut bucket = String::from("main");

        for line in clean_lines(output) {
            if line.starts_with('\'') {
                bucket = line
                    .split(' ')
                    .next()
                    .unwrap_or("")
                    .trim_matches('\'')
                    .to_string();
                continue;
            }
            // App rows are indented under their bucket header
            if !line.starts_with([' ', '\t']) {
                continue;
            }
            let parts = split_spaces(&line);
            if parts.len() < 2 {
                continue;
            }
            let id = parts[0];
            let version = parts[1].trim_start_matches('(').trim_end_matches(')');
            packages.push(Package::new(
                format_id_as_name(id),
                id,
                version,
                format!("{}{}", USER_PREFIX, bucket),
                Backend::Scoop,
            ));
        }
        packages
    }

    fn parse_installed(&self, output: &str) -> Vec<Package> {
        rows_after_rule(output)
            .into_iter()
            .filter_map(|line| {
                let parts = split_spaces(&line);
                if parts.len() < 3 {
                    tracing::debug!(line = %line, "short scoop list row skipped");
                    return None;
                }
                let prefix = if line.contains("Global install") {
                    GLOBAL_PREFIX
                } else {
                    USER_PREFIX
                };
                Some(Package::new(
                    format_id_as_name(parts[0]),
                    parts[0],
                    parts[1],
                    format!("{}{}", prefix, parts[2]),
                    Backend::Scoop,
                ))
            })
            .collect()
    }

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage> {
        rows_after_rule(output)
            .into_iter()
            .filter_map(|line| {
                if line.contains("Held package") {
                    tracing::debug!(line = %line, "held scoop package skipped");
                    return None;
                }
                let parts = split_spaces(&line);
                if parts.len() < 3 {
                    return None;
                }
                let pkg = Package::new(
                    format_id_as_name(parts[0]),
                    parts[0],
                    parts[1],
                    "Scoop",
                    Backend::Scoop,
                );
                Some(UpgradablePackage::new(pkg, parts[2]))
            })
            .collect()
    }

    /// `scoop status` does not print buckets, so sources come from the installed list.
    fn list_updates(&self, runner: &dyn CommandRunner) -> Result<Vec<UpgradablePackage>> {
        let installed: HashMap<(String, String), String> = self
            .list_installed(runner)?
            .into_iter()
            .map(|p| ((p.id, p.version), p.source))
            .collect();

        let output = runner.run(self.executable(), &self.updates_command())?;
        let blacklist = self.blacklist();
        let mut updates = Vec::new();
        for up in self.parse_updates(&output) {
            if !blacklist.admits_update(&up) {
                continue;
            }
            match installed.get(&(up.package.id.clone(), up.package.version.clone())) {
                Some(source) => {
                    let mut pkg = up.package.clone();
                    pkg.source = source.clone();
                    updates.push(UpgradablePackage::new(pkg, up.new_version));
                }
                None => {
                    tracing::warn!(id = %up.package.id, "upgradable scoop package not in installed list");
                }
            }
        }
        Ok(updates)
    }

    fn parse_details(&self, package: &Package, outputs: &[String]) -> PackageDetails {
        let mut details = PackageDetails::new(package.clone());
        details.scopes = strings(&["user", "global"]);
        details.architectures = strings(&["64bit", "32bit", "arm64"]);

        let (bucket, _) = Self::bucket_of(&package.source);
        if let Some(bucket) = bucket {
            if bucket.starts_with("http") {
                details.manifest_url = Detail::text(bucket);
            } else if bucket.contains(":\\") {
                details.manifest_url = Detail::text(format!("file:///{}", bucket.replace('\\', "/")));
            } else if let Some((_, url)) = KNOWN_BUCKETS.iter().find(|(name, _)| *name == bucket) {
                details.manifest_url = Detail::text(format!("{}/blob/master/bucket/{}.json", url, package.id));
            }
        }

        let Some(raw) = outputs.first() else {
            return details;
        };
        let manifest: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(id = %package.id, error = %e, "scoop manifest is not valid JSON");
                return details;
            }
        };

        details.description = text_or_lines(manifest.get("description"));
        details.release_notes = text_or_lines(manifest.get("notes"));
        details.installer_type = if manifest.get("innosetup").and_then(Value::as_bool) == Some(true) {
            Detail::text("Inno Setup (extracted)")
        } else {
            Detail::text("Scoop package")
        };

        if let Some(homepage) = manifest.get("homepage").and_then(Value::as_str) {
            details.homepage_url = Detail::text(homepage);
            if let Some(author) = author_from_homepage(homepage) {
                details.author = Detail::text(author);
            }
        }

        match manifest.get("license") {
            Some(Value::Object(license)) => {
                details.license = license.get("identifier").and_then(Value::as_str).map(Detail::text).unwrap_or_default();
                details.license_url = license.get("url").and_then(Value::as_str).map(Detail::text).unwrap_or_default();
            }
            other => details.license = text_or_lines(other),
        }

        if manifest.get("url").is_some() {
            details.installer_url = first_string(manifest.get("url"));
            details.installer_hash = first_string(manifest.get("hash"));
        } else if let Some(Value::Object(archs)) = manifest.get("architecture") {
            let entry = archs.get("64bit").or_else(|| archs.values().next());
            if let Some(entry) = entry {
                details.installer_url = first_string(entry.get("url"));
                details.installer_hash = first_string(entry.get("hash"));
            }
        }

        if let Some(url) = manifest.pointer("/checkver/url").and_then(Value::as_str) {
            details.release_notes_url = Detail::text(url);
        }
        details
    }

    fn search_command(&self, query: &str) -> Vec<String> {
        strings(&["search", query])
    }

    fn installed_command(&self) -> Vec<String> {
        strings(&["list"])
    }

    fn updates_command(&self) -> Vec<String> {
        strings(&["status"])
    }

    fn details_commands(&self, package: &Package) -> Vec<Vec<String>> {
        vec![strings(&["cat", &Self::qualified_id(package)])]
    }

    fn build_parameters(&self, kind: OperationKind, options: &InstallationOptions) -> Vec<String> {
        let mut params = Vec::new();
        if kind == OperationKind::Install
            && let Some(arch) = &options.architecture
        {
            let scoop_arch = match arch.to_lowercase().as_str() {
                "x64" | "64bit" => Some("64bit"),
                "x86" | "32bit" => Some("32bit"),
                "arm64" => Some("arm64"),
                _ => None,
            };
            if let Some(a) = scoop_arch {
                params.extend(strings(&["--arch", a]));
            }
        }
        match kind {
            OperationKind::Uninstall => {
                if options.remove_data_on_uninstall {
                    params.push("--purge".to_string());
                }
            }
            _ => {
                if options.skip_hash_check {
                    params.push("--skip".to_string());
                }
            }
        }
        params.extend(options.custom_parameters.iter().cloned());
        params
    }

    fn operation_args(&self, kind: OperationKind, package: &Package, options: &InstallationOptions) -> Vec<String> {
        let verb = match kind {
            OperationKind::Install => "install",
            OperationKind::Update => "update",
            OperationKind::Uninstall => "uninstall",
        };
        let mut args = strings(&[verb, &Self::qualified_id(package)]);
        if Self::wants_global(package, options) {
            args.push("--global".to_string());
        }
        args
    }

    /// Global installs always need elevation.
    fn build_command(&self, kind: OperationKind, package: &Package, options: &InstallationOptions) -> OperationCommand {
        let mut args = self.operation_args(kind, package, options);
        args.extend(self.build_parameters(kind, options));
        OperationCommand {
            program: self.executable().to_string(),
            args,
            elevated: options.run_as_admin || Self::wants_global(package, options),
        }
    }

    fn classify(
        &self,
        _kind: OperationKind,
        _exit_code: Option<i32>,
        output: &str,
        options: &InstallationOptions,
    ) -> ResultCode {
        // scoop exits 0 on most failures and sometimes 1 after a good install
        let succeeded = SUCCESS_MARKERS.iter().any(|m| output.contains(m));
        if output.contains("Latest versions for all apps are installed") {
            return ResultCode::NoApplicableUpdateFound;
        }
        if !succeeded && !options.run_as_admin && mentions_global_flag(output) {
            return ResultCode::NeedsBackendScopeRetry;
        }
        if !succeeded && ADMIN_MARKERS.iter().any(|m| output.contains(m)) {
            return ResultCode::NeedsElevation;
        }
        if succeeded {
            ResultCode::Succeeded
        } else {
            ResultCode::Failed
        }
    }

    fn scope_retry(&self, options: &InstallationOptions) -> Option<InstallationOptions> {
        if options.scope == Some(Scope::Machine) {
            return None;
        }
        let mut next = options.elevated();
        next.scope = Some(Scope::Machine);
        Some(next)
    }

    fn progress_hint(&self, line: &str) -> Option<u8> {
        if line.contains("was installed successfully") || line.contains("was updated successfully") {
            Some(90)
        } else if line.contains("] 100%") || line.contains("Downloading") {
            Some(60)
        } else if line.contains("Installing") || line.contains("Updating") {
            Some(25)
        } else {
            None
        }
    }
}
