//! Npm backend
//!
//! Local and global installs are listed separately; global packages carry
//! the `Npm@global` source so later operations know to pass `--global`.

use crate::backends::parsers::{Blacklist, clean_lines, rows_after_header, split_delimited, split_spaces};
use crate::core::capabilities::Capabilities;
use crate::core::identity::format_id_as_name;
use crate::core::options::InstallationOptions;
use crate::core::types::{Backend, Detail, OperationKind, Package, PackageDetails, Scope, UpgradablePackage};
use crate::error::Result;
use crate::operations::result::ResultCode;
use crate::packages::traits::{CommandRunner, PackageManager, strings};

const LOCAL_SOURCE: &str = "Npm";
const GLOBAL_SOURCE: &str = "Npm@global";

const NPM_BLACKLIST: Blacklist = Blacklist {
    names: &[],
    ids: &["", "NAME", "Package"],
    versions: &["", "VERSION", "Current"],
};

const TREE_MARKERS: &[&str] = &["├──", "└──", "+--", "`--"];

pub struct NpmManager;

impl NpmManager {
    pub fn new() -> Self {
        Self
    }

    fn with_global(mut args: Vec<String>) -> Vec<String> {
        args.push("--global".to_string());
        args
    }

    fn is_global(package: &Package, options: &InstallationOptions) -> bool {
        package.source == GLOBAL_SOURCE || options.scope == Some(Scope::Machine)
    }

    /// Split `@scope/name@1.2.3` into id and version at the last `@`.
    fn split_spec(spec: &str) -> Option<(&str, &str)> {
        let (id, version) = spec.rsplit_once('@')?;
        (!id.is_empty()).then_some((id, version))
    }

    fn tree_rows(&self, output: &str, source: &str) -> Vec<Package> {
        clean_lines(output)
            .iter()
            .filter_map(|line| {
                let marker = TREE_MARKERS.iter().find(|m| line.contains(*m))?;
                let (_, rest) = line.split_once(marker)?;
                let spec = rest.split_whitespace().next()?;
                let (id, version) = Self::split_spec(spec)?;
                Some(Package::new(format_id_as_name(id), id, version, source, Backend::Npm))
            })
            .collect()
    }

    fn outdated_rows(&self, output: &str, source: &str) -> Vec<UpgradablePackage> {
        rows_after_header(output, |l| l.starts_with("Package"))
            .iter()
            .filter_map(|line| {
                let parts = split_spaces(line);
                if parts.len() < 4 {
                    return None;
                }
                let pkg = Package::new(format_id_as_name(parts[0]), parts[0], parts[1], source, Backend::Npm);
                Some(UpgradablePackage::new(pkg, parts[3]))
            })
            .collect()
    }
}

impl Default for NpmManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for NpmManager {
    fn backend_type(&self) -> Backend {
        Backend::Npm
    }

    fn executable(&self) -> &'static str {
        "npm"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_custom_versions: true,
            supports_custom_scopes: true,
            ..Capabilities::NONE
        }
    }

    fn blacklist(&self) -> Blacklist {
        NPM_BLACKLIST
    }

    fn parse_packages(&self, output: &str) -> Vec<Package> {
        rows_after_header(output, |l| l.starts_with("NAME"))
            .iter()
            .filter_map(|line| {
                let fields = split_delimited(line, '|');
                if fields.len() < 5 {
                    return None;
                }
                Some(Package::new(
                    format_id_as_name(&fields[0]),
                    fields[0].clone(),
                    fields[4].clone(),
                    LOCAL_SOURCE,
                    Backend::Npm,
                ))
            })
            .collect()
    }

    fn parse_installed(&self, output: &str) -> Vec<Package> {
        self.tree_rows(output, LOCAL_SOURCE)
    }

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage> {
        self.outdated_rows(output, LOCAL_SOURCE)
    }

    fn list_installed(&self, runner: &dyn CommandRunner) -> Result<Vec<Package>> {
        let local = runner.run(self.executable(), &self.installed_command())?;
        let global = runner.run(self.executable(), &Self::with_global(self.installed_command()))?;
        let mut packages = self.tree_rows(&local, LOCAL_SOURCE);
        packages.extend(self.tree_rows(&global, GLOBAL_SOURCE));
        Ok(self.blacklist().filter(packages))
    }

    fn list_updates(&self, runner: &dyn CommandRunner) -> Result<Vec<UpgradablePackage>> {
        let local = runner.run(self.executable(), &self.updates_command())?;
        let global = runner.run(self.executable(), &Self::with_global(self.updates_command()))?;
        let blacklist = self.blacklist();
        Ok(self
            .outdated_rows(&local, LOCAL_SOURCE)
            .into_iter()
            .chain(self.outdated_rows(&global, GLOBAL_SOURCE))
            .filter(|u| blacklist.admits_update(u))
            .collect())
    }

    fn parse_details(&self, package: &Package, outputs: &[String]) -> PackageDetails {
        let mut details = PackageDetails::new(package.clone());
        details.manifest_url = Detail::text(format!("https://www.npmjs.com/package/{}", package.id));
        details.installer_type = Detail::text("Tarball");
        details.scopes = strings(&["local", "global"]);

        let lines = outputs.first().map(|o| clean_lines(o)).unwrap_or_default();
        if let Some(header) = lines.first()
            && let Some(license) = header.split('|').nth(1)
        {
            details.license = Detail::text(license);
        }
        if let Some(description) = lines.get(1)
            && !description.contains(':')
        {
            details.description = Detail::text(description.as_str());
        }
        if let Some(homepage) = lines.get(2)
            && homepage.starts_with("http")
        {
            details.homepage_url = Detail::text(homepage.as_str());
        }

        let mut in_maintainers = false;
        for line in &lines {
            if in_maintainers {
                if let Some(maintainer) = line.strip_prefix("- ") {
                    let name = maintainer.split(" <").next().unwrap_or(maintainer);
                    if !details.publisher.is_known() {
                        details.publisher = Detail::text(name);
                        details.author = Detail::text(name);
                    }
                    continue;
                }
                in_maintainers = false;
            }
            if let Some(url) = line.strip_prefix(".tarball:") {
                details.installer_url = Detail::text(url);
            } else if let Some(hash) = line.strip_prefix(".integrity:") {
                details.installer_hash = Detail::text(hash);
            } else if let Some(keywords) = line.strip_prefix("keywords:") {
                details.tags = keywords
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
            } else if line.starts_with("maintainers:") {
                in_maintainers = true;
            } else if let Some(published) = line.strip_prefix("published") {
                let when = published.split(" by ").next().unwrap_or(published);
                details.update_date = Detail::text(when);
            }
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
        vec![strings(&["info", &package.id])]
    }

    fn build_parameters(&self, _kind: OperationKind, options: &InstallationOptions) -> Vec<String> {
        options.custom_parameters.clone()
    }

    fn operation_args(&self, kind: OperationKind, package: &Package, options: &InstallationOptions) -> Vec<String> {
        let mut args = match kind {
            OperationKind::Install => {
                let version = options.version.as_deref().unwrap_or("latest");
                strings(&["install", &format!("{}@{}", package.id, version)])
            }
            OperationKind::Update => {
                let version = options
                    .version
                    .as_deref()
                    .or(options.update_target.as_deref())
                    .unwrap_or("latest");
                strings(&["install", &format!("{}@{}", package.id, version)])
            }
            OperationKind::Uninstall => strings(&["uninstall", &package.id]),
        };
        if Self::is_global(package, options) {
            args.push("--global".to_string());
        }
        args
    }

    fn classify(
        &self,
        _kind: OperationKind,
        exit_code: Option<i32>,
        _output: &str,
        _options: &InstallationOptions,
    ) -> ResultCode {
        if exit_code == Some(0) {
            ResultCode::Succeeded
        } else {
            ResultCode::Failed
        }
    }
}
