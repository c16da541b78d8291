//! Pip backend
//!
//! `pip list` tables follow a dashed rule. Search goes through the
//! `parse_pip_search` helper since PyPI disabled `pip search`.

use crate::backends::parsers::{Blacklist, field, rows_after_rule, scan_fields, split_delimited, split_spaces};
use crate::core::capabilities::Capabilities;
use crate::core::identity::format_id_as_name;
use crate::core::options::InstallationOptions;
use crate::core::types::{Backend, Detail, OperationKind, Package, PackageDetails, Scope, UpgradablePackage};
use crate::error::Result;
use crate::operations::result::ResultCode;
use crate::packages::traits::{CommandRunner, PackageManager, strings};

const SOURCE: &str = "Pip";
const SEARCH_TOOL: &str = "parse_pip_search";

const PIP_BLACKLIST: Blacklist = Blacklist {
    names: &[],
    ids: &["", "WARNING:", "[notice]", "Package", "Name"],
    versions: &["", "Ignoring", "Version"],
};

const QUIET_FLAGS: &[&str] = &["--no-input", "--no-color", "--no-python-version-warning", "--no-cache"];

const DETAIL_KEYS: &[&str] = &["Author", "Home-page", "License", "Summary", "Classifiers"];

pub struct PipManager;

impl PipManager {
    pub fn new() -> Self {
        Self
    }

    fn package(id: &str, version: &str) -> Package {
        Package::new(format_id_as_name(id), id, version, SOURCE, Backend::Pip)
    }
}

impl Default for PipManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for PipManager {
    fn backend_type(&self) -> Backend {
        Backend::Pip
    }

    fn executable(&self) -> &'static str {
        "pip"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_custom_versions: true,
            supports_custom_scopes: true,
            supports_pre_release: true,
            ..Capabilities::NONE
        }
    }

    fn blacklist(&self) -> Blacklist {
        PIP_BLACKLIST
    }

    fn parse_packages(&self, output: &str) -> Vec<Package> {
        rows_after_rule(output)
            .iter()
            .filter_map(|line| {
                let fields = split_delimited(line, '|');
                (fields.len() >= 2).then(|| Self::package(&fields[0], &fields[1]))
            })
            .collect()
    }

    fn parse_installed(&self, output: &str) -> Vec<Package> {
        rows_after_rule(output)
            .iter()
            .filter_map(|line| {
                let parts = split_spaces(line);
                (parts.len() >= 2).then(|| Self::package(parts[0], parts[1]))
            })
            .collect()
    }

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage> {
        rows_after_rule(output)
            .iter()
            .filter_map(|line| {
                let parts = split_spaces(line);
                (parts.len() >= 3).then(|| UpgradablePackage::new(Self::package(parts[0], parts[1]), parts[2]))
            })
            .collect()
    }

    fn search(&self, runner: &dyn CommandRunner, query: &str) -> Result<Vec<Package>> {
        let output = runner.run(SEARCH_TOOL, &self.search_command(query))?;
        Ok(self.blacklist().filter(self.parse_packages(&output)))
    }

    fn parse_details(&self, package: &Package, outputs: &[String]) -> PackageDetails {
        let mut details = PackageDetails::new(package.clone());
        details.manifest_url = Detail::text(format!("https://pypi.org/project/{}/", package.id));
        details.scopes = strings(&["user", "global"]);

        let Some(show) = outputs.first() else {
            return details;
        };
        let fields = scan_fields(show, DETAIL_KEYS);
        let value = |key: &str| field(&fields, key).map(|f| Detail::text(f.value.as_str())).unwrap_or_default();

        details.author = value("Author");
        details.publisher = details.author.clone();
        details.homepage_url = value("Home-page");
        details.license = value("License");
        details.description = value("Summary");

        if let Some(classifiers) = field(&fields, "Classifiers") {
            for classifier in &classifiers.continuation {
                if let Some(license) = classifier.strip_prefix("License ::") {
                    if !details.license.is_known() {
                        let name = license.rsplit("::").next().unwrap_or(license);
                        details.license = Detail::text(name);
                    }
                } else if let Some(topic) = classifier.strip_prefix("Topic ::") {
                    details.tags.push(topic.trim().to_string());
                }
            }
        }
        details
    }

    fn search_command(&self, query: &str) -> Vec<String> {
        strings(&[query])
    }

    fn installed_command(&self) -> Vec<String> {
        strings(&["list"])
    }

    fn updates_command(&self) -> Vec<String> {
        strings(&["list", "--outdated"])
    }

    fn details_commands(&self, package: &Package) -> Vec<Vec<String>> {
        vec![strings(&["show", &package.id, "-v"])]
    }

    fn build_parameters(&self, kind: OperationKind, options: &InstallationOptions) -> Vec<String> {
        let mut params = options.custom_parameters.clone();
        if options.scope == Some(Scope::User) && !params.iter().any(|p| p == "--user") {
            params.push("--user".to_string());
        }
        if kind != OperationKind::Uninstall && options.pre_release {
            params.push("--pre".to_string());
        }
        params.extend(strings(QUIET_FLAGS));
        if kind != OperationKind::Uninstall {
            params.extend(strings(&["--progress-bar", "off"]));
        }
        params
    }

    fn operation_args(&self, kind: OperationKind, package: &Package, options: &InstallationOptions) -> Vec<String> {
        let pinned = match kind {
            OperationKind::Install => options.version.as_deref(),
            OperationKind::Update => options.version.as_deref().or(options.update_target.as_deref()),
            OperationKind::Uninstall => None,
        };
        let spec = match pinned {
            Some(version) => format!("{}=={}", package.id, version),
            None => package.id.clone(),
        };
        match kind {
            OperationKind::Install => strings(&["install", &spec]),
            OperationKind::Update => strings(&["install", &spec, "--upgrade"]),
            OperationKind::Uninstall => strings(&["uninstall", &spec, "-y"]),
        }
    }

    fn classify(
        &self,
        _kind: OperationKind,
        exit_code: Option<i32>,
        output: &str,
        options: &InstallationOptions,
    ) -> ResultCode {
        match exit_code {
            Some(0) => ResultCode::Succeeded,
            Some(_) if options.scope != Some(Scope::User) && output.contains("--user") => {
                ResultCode::NeedsBackendScopeRetry
            }
            _ => ResultCode::Failed,
        }
    }

    fn scope_retry(&self, options: &InstallationOptions) -> Option<InstallationOptions> {
        (options.scope != Some(Scope::User)).then(|| InstallationOptions {
            scope: Some(Scope::User),
            ..options.clone()
        })
    }

    fn progress_hint(&self, line: &str) -> Option<u8> {
        if line.starts_with("Collecting") {
            Some(20)
        } else if line.starts_with("Downloading") {
            Some(40)
        } else if line.starts_with("Installing collected packages") {
            Some(70)
        } else if line.starts_with("Successfully installed") || line.starts_with("Successfully uninstalled") {
            Some(100)
        } else {
            None
        }
    }
}
