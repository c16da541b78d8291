//! Chocolatey backend
//!
//! `choco list` and `choco search` print `id version` rows between a
//! `Chocolatey vX` banner and a `N packages found.` footer. `choco outdated`
//! prints `id|current|available|pinned` rows. There is no fast way to list
//! the whole community repository, so discovery goes through the catalog
//! cache (`choco search *`).

use crate::backends::parsers::{Blacklist, clean_lines, split_delimited, split_spaces};
use crate::core::capabilities::Capabilities;
use crate::core::identity::format_id_as_name;
use crate::core::options::InstallationOptions;
use crate::core::types::{Backend, Detail, OperationKind, Package, PackageDetails, UpgradablePackage};
use crate::operations::result::ResultCode;
use crate::packages::traits::{PackageManager, strings};

const SOURCE: &str = "Chocolatey";

const CHOCO_BLACKLIST: Blacklist = Blacklist {
    names: &[""],
    ids: &[
        "Directory",
        "",
        "Did",
        "Features?",
        "Validation",
        "-",
        "being",
        "It",
        "Error",
        "L'accs",
        "Maximum",
        "This",
        "Output is package name",
        "operable",
        "Invalid",
    ],
    versions: &[
        "",
        "Did",
        "Features?",
        "Validation",
        "-",
        "being",
        "It",
        "Error",
        "L'accs",
        "Maximum",
        "This",
        "packages",
        "current version",
        "installed version",
        "is",
        "program",
        "validations",
        "argument",
        "no",
    ],
};

const ELEVATION_HINTS: &[&str] = &[
    "Run as administrator",
    "The requested operation requires elevation",
    "Access to the path",
    "Access denied",
    "access denied",
    "is denied",
];

pub struct ChocolateyManager;

impl ChocolateyManager {
    pub fn new() -> Self {
        Self
    }

    fn package(id: &str, version: &str) -> Package {
        Package::new(format_id_as_name(id), id, version, SOURCE, Backend::Chocolatey)
    }
}

impl Default for ChocolateyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for ChocolateyManager {
    fn backend_type(&self) -> Backend {
        Backend::Chocolatey
    }

    fn executable(&self) -> &'static str {
        "choco"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_run_as_admin: true,
            can_skip_integrity_checks: true,
            can_run_interactively: true,
            supports_custom_versions: true,
            supports_custom_architectures: true,
            supports_pre_release: true,
            ..Capabilities::NONE
        }
    }

    fn blacklist(&self) -> Blacklist {
        CHOCO_BLACKLIST
    }

    fn parse_packages(&self, output: &str) -> Vec<Package> {
        clean_lines(output)
            .iter()
            .filter(|line| !line.starts_with("Chocolatey"))
            .filter_map(|line| {
                let parts = split_spaces(line);
                (parts.len() >= 2).then(|| Self::package(parts[0], parts[1]))
            })
            .collect()
    }

    fn parse_installed(&self, output: &str) -> Vec<Package> {
        self.parse_packages(output)
    }

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage> {
        clean_lines(output)
            .iter()
            .filter(|line| !line.starts_with("Chocolatey"))
            .filter_map(|line| {
                let fields = split_delimited(line, '|');
                if fields.len() <= 2 || fields[1] == fields[2] {
                    return None;
                }
                Some(UpgradablePackage::new(Self::package(&fields[0], &fields[1]), fields[2].clone()))
            })
            .collect()
    }

    fn parse_details(&self, package: &Package, outputs: &[String]) -> PackageDetails {
        let mut details = PackageDetails::new(package.clone());
        details.manifest_url = Detail::text(format!("https://community.chocolatey.org/packages/{}", package.id));
        details.installer_type = Detail::text("NuPkg (zipped manifest)");
        details.installer_url = Detail::text(format!(
            "https://packages.chocolatey.org/{}.{}.nupkg",
            package.id, package.version
        ));
        details.architectures = strings(&["x64", "x86"]);

        #[derive(PartialEq)]
        enum Loading {
            Nothing,
            Description,
            ReleaseNotes,
        }
        let mut loading = Loading::Nothing;

        for line in outputs.first().map(|o| clean_lines(o)).unwrap_or_default() {
            if line.starts_with("  ") && loading != Loading::Nothing {
                match loading {
                    Loading::Description => details.description.append_line(line.trim()),
                    Loading::ReleaseNotes => details.release_notes.append_line(line.trim()),
                    Loading::Nothing => {}
                }
                continue;
            }
            loading = Loading::Nothing;
            if !line.starts_with(' ') {
                continue;
            }

            let trimmed = line.trim();
            let value_after = |key: &str| trimmed.strip_prefix(key).map(|v| v.trim().to_string());

            if trimmed.starts_with("Title:") {
                if let Some(published) = trimmed.split('|').nth(1) {
                    details.update_date = Detail::text(published.trim().trim_start_matches("Published:"));
                }
            } else if let Some(v) = value_after("Author:") {
                details.author = Detail::text(v);
            } else if let Some(v) = value_after("Maintainer(s):") {
                details.publisher = Detail::text(v);
            } else if let Some(v) = value_after("Software Site:") {
                details.homepage_url = Detail::text(v);
            } else if let Some(v) = value_after("Software License:") {
                details.license_url = Detail::text(v);
            } else if let Some(v) = value_after("Package Checksum:") {
                let hash = v.split_whitespace().next().unwrap_or("").trim_matches('\'');
                details.installer_hash = Detail::text(hash);
            } else if let Some(v) = value_after("Description:") {
                details.description = Detail::text(v);
                loading = Loading::Description;
            } else if let Some(v) = value_after("Release Notes:") {
                if v.starts_with("http") {
                    details.release_notes_url = Detail::text(v);
                } else {
                    details.release_notes = Detail::text(v);
                }
                loading = Loading::ReleaseNotes;
            } else if let Some(v) = value_after("Tags:") {
                details.tags = v.split_whitespace().map(str::to_string).collect();
            }
        }

        if let Some(versions) = outputs.get(1) {
            details.versions = clean_lines(versions)
                .iter()
                .filter_map(|line| {
                    let parts = split_spaces(line);
                    (parts.len() >= 2 && parts[0] == package.id).then(|| parts[1].to_string())
                })
                .collect();
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
        strings(&["outdated"])
    }

    fn details_commands(&self, package: &Package) -> Vec<Vec<String>> {
        vec![
            strings(&["info", &package.id]),
            strings(&["search", &package.id, "--exact", "--all-versions"]),
        ]
    }

    fn catalog_command(&self) -> Option<Vec<String>> {
        Some(strings(&["search", "*"]))
    }

    fn build_parameters(&self, kind: OperationKind, options: &InstallationOptions) -> Vec<String> {
        let mut params = Vec::new();
        let installing = kind != OperationKind::Uninstall;

        if installing {
            params.push("--no-progress".to_string());
            if options.architecture.as_deref() == Some("x86") {
                params.push("--forcex86".to_string());
            }
            if let Some(version) = &options.version {
                params.push(format!("--version={}", version));
                params.push("--allow-downgrade".to_string());
            }
        }
        if options.interactive {
            params.push("--notsilent".to_string());
        }
        if installing {
            if options.skip_hash_check {
                params.extend(strings(&["--ignore-checksums", "--force"]));
            }
            if options.pre_release {
                params.push("--prerelease".to_string());
            }
        }
        params.extend(options.custom_parameters.iter().cloned());
        params
    }

    fn operation_args(&self, kind: OperationKind, package: &Package, _options: &InstallationOptions) -> Vec<String> {
        let verb = match kind {
            OperationKind::Install => "install",
            OperationKind::Update => "upgrade",
            OperationKind::Uninstall => "uninstall",
        };
        strings(&[verb, &package.id, "-y"])
    }

    fn classify(
        &self,
        kind: OperationKind,
        exit_code: Option<i32>,
        output: &str,
        options: &InstallationOptions,
    ) -> ResultCode {
        match (kind, exit_code) {
            (_, Some(3010)) => return ResultCode::NeedsRestart,
            (_, Some(0 | 1641)) => return ResultCode::Succeeded,
            (OperationKind::Uninstall, Some(1605 | 1614)) => return ResultCode::Succeeded,
            _ => {}
        }
        if !options.run_as_admin && ELEVATION_HINTS.iter().any(|hint| output.contains(hint)) {
            return ResultCode::NeedsElevation;
        }
        ResultCode::Failed
    }

    fn progress_hint(&self, line: &str) -> Option<u8> {
        if line.contains("Downloading") {
            Some(30)
        } else if line.contains("Installing") || line.contains("Uninstalling") {
            Some(60)
        } else if line.contains("The install of") || line.contains("has been successfully uninstalled") {
            Some(100)
        } else {
            None
        }
    }
}
