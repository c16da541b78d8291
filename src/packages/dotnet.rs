//! .NET tool backend (`dotnet tool`)
//!
//! All listings print a whitespace table after a dashed rule. The dotnet CLI
//! has no "outdated" verb, so updates come from the `dotnet-tools-outdated`
//! global tool.

use crate::backends::parsers::{Blacklist, rows_after_rule, split_spaces};
use crate::core::capabilities::Capabilities;
use crate::core::identity::format_id_as_name;
use crate::core::options::InstallationOptions;
use crate::core::types::{Backend, Detail, OperationKind, Package, PackageDetails, UpgradablePackage};
use crate::error::Result;
use crate::operations::result::ResultCode;
use crate::packages::traits::{CommandRunner, PackageManager, strings};

const SOURCE: &str = "nuget.org";
const OUTDATED_TOOL: &str = "dotnet-tools-outdated";

const DOTNET_BLACKLIST: Blacklist = Blacklist {
    names: &[],
    ids: &[""],
    versions: &[""],
};

pub struct DotnetManager;

impl DotnetManager {
    pub fn new() -> Self {
        Self
    }

    fn rows(output: &str, min_fields: usize) -> Vec<Vec<String>> {
        rows_after_rule(output)
            .iter()
            .map(|line| split_spaces(line).into_iter().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| parts.len() >= min_fields)
            .collect()
    }

    fn package(id: &str, version: &str) -> Package {
        Package::new(format_id_as_name(id), id, version, SOURCE, Backend::Dotnet)
    }
}

impl Default for DotnetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for DotnetManager {
    fn backend_type(&self) -> Backend {
        Backend::Dotnet
    }

    fn executable(&self) -> &'static str {
        "dotnet"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_run_as_admin: true,
            supports_custom_versions: true,
            supports_custom_architectures: true,
            supports_pre_release: true,
            ..Capabilities::NONE
        }
    }

    fn blacklist(&self) -> Blacklist {
        DOTNET_BLACKLIST
    }

    fn parse_packages(&self, output: &str) -> Vec<Package> {
        Self::rows(output, 2)
            .iter()
            .map(|parts| Self::package(&parts[0], &parts[1]))
            .collect()
    }

    fn parse_installed(&self, output: &str) -> Vec<Package> {
        self.parse_packages(output)
    }

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage> {
        Self::rows(output, 3)
            .iter()
            .map(|parts| UpgradablePackage::new(Self::package(&parts[0], &parts[1]), parts[2].clone()))
            .collect()
    }

    fn list_updates(&self, runner: &dyn CommandRunner) -> Result<Vec<UpgradablePackage>> {
        let output = runner.run(OUTDATED_TOOL, &self.updates_command())?;
        let blacklist = self.blacklist();
        Ok(self
            .parse_updates(&output)
            .into_iter()
            .filter(|u| blacklist.admits_update(u))
            .collect())
    }

    fn parse_details(&self, package: &Package, _outputs: &[String]) -> PackageDetails {
        let mut details = PackageDetails::new(package.clone());
        details.manifest_url = Detail::text(format!("https://www.nuget.org/packages/{}", package.id));
        details.installer_url = Detail::text(format!(
            "https://globalcdn.nuget.org/packages/{}.{}.nupkg",
            package.id.to_lowercase(),
            package.version
        ));
        details.installer_type = Detail::text("NuPkg (zipped manifest)");
        details.architectures = strings(&["x64", "x86", "arm64", "arm32"]);
        details
    }

    fn search_command(&self, query: &str) -> Vec<String> {
        strings(&["tool", "search", query])
    }

    fn installed_command(&self) -> Vec<String> {
        strings(&["tool", "list", "--global"])
    }

    /// Arguments for `dotnet-tools-outdated` (none).
    fn updates_command(&self) -> Vec<String> {
        Vec::new()
    }

    fn details_commands(&self, _package: &Package) -> Vec<Vec<String>> {
        Vec::new()
    }

    fn details(&self, _runner: &dyn CommandRunner, package: &Package) -> Result<PackageDetails> {
        Ok(self.parse_details(package, &[]))
    }

    fn build_parameters(&self, kind: OperationKind, options: &InstallationOptions) -> Vec<String> {
        let mut params = strings(&["--global"]);
        if kind != OperationKind::Uninstall {
            if let Some(arch) = &options.architecture {
                params.extend(strings(&["-a", arch]));
            }
            if kind == OperationKind::Install
                && let Some(version) = &options.version
            {
                params.extend(strings(&["--version", version]));
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
            OperationKind::Update => "update",
            OperationKind::Uninstall => "uninstall",
        };
        strings(&["tool", verb, &package.id])
    }

    fn classify(
        &self,
        _kind: OperationKind,
        exit_code: Option<i32>,
        output: &str,
        _options: &InstallationOptions,
    ) -> ResultCode {
        match exit_code {
            Some(0) => ResultCode::Succeeded,
            Some(_) if output.contains("is already installed") => ResultCode::Succeeded,
            _ => ResultCode::Failed,
        }
    }
}
