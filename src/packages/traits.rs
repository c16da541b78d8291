use crate::backends::command_exec::{resolve_executable, run_listing};
use crate::backends::parsers::Blacklist;
use crate::core::capabilities::Capabilities;
use crate::core::options::InstallationOptions;
use crate::core::types::{Backend, OperationKind, Package, PackageDetails, UpgradablePackage};
use crate::error::Result;
use crate::operations::result::ResultCode;
use crate::utils::platform;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Runs a listing command and returns its merged output.
///
/// Backends never spawn listing processes themselves, so parsers can be
/// exercised against captured console output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

/// Runs commands on this machine, resolving executables on PATH.
pub struct SystemRunner {
    pub timeout: Duration,
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let exe = resolve_executable(program)?;
        tracing::debug!(command = %platform::display_command_line(program, args, false), "running listing");
        let mut cmd = Command::new(exe);
        cmd.args(args);
        run_listing(&mut cmd, self.timeout)
    }
}

/// A mutating command ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationCommand {
    pub program: String,
    pub args: Vec<String>,
    pub elevated: bool,
}

impl OperationCommand {
    pub fn display(&self) -> String {
        platform::display_command_line(&self.program, &self.args, self.elevated)
    }

    /// Spawnable command for the executable `program` resolved to.
    pub fn to_command(&self, executable: &Path) -> Command {
        platform::build_program_command(executable, &self.args, self.elevated)
    }
}

pub(crate) fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// One supported package manager.
///
/// Parsers are pure functions of console text. Listing methods have default
/// implementations that run the backend's command through a [`CommandRunner`],
/// parse the output and apply the backend's [`Blacklist`].
pub trait PackageManager: Send + Sync {
    fn backend_type(&self) -> Backend;

    /// Executable name resolved on PATH
    fn executable(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn blacklist(&self) -> Blacklist {
        Blacklist::EMPTY
    }

    // --- parsers -------------------------------------------------------

    /// Search/discover output into packages
    fn parse_packages(&self, output: &str) -> Vec<Package>;

    fn parse_installed(&self, output: &str) -> Vec<Package>;

    fn parse_updates(&self, output: &str) -> Vec<UpgradablePackage>;

    /// `outputs` holds one entry per command from [`PackageManager::details_commands`]
    fn parse_details(&self, package: &Package, outputs: &[String]) -> PackageDetails;

    // --- listing commands ----------------------------------------------

    fn search_command(&self, query: &str) -> Vec<String>;

    fn installed_command(&self) -> Vec<String>;

    fn updates_command(&self) -> Vec<String>;

    fn details_commands(&self, package: &Package) -> Vec<Vec<String>>;

    /// Full catalog scan for cache-backed backends
    fn catalog_command(&self) -> Option<Vec<String>> {
        None
    }

    fn search(&self, runner: &dyn CommandRunner, query: &str) -> Result<Vec<Package>> {
        let output = runner.run(self.executable(), &self.search_command(query))?;
        Ok(self.blacklist().filter(self.parse_packages(&output)))
    }

    fn list_installed(&self, runner: &dyn CommandRunner) -> Result<Vec<Package>> {
        let output = runner.run(self.executable(), &self.installed_command())?;
        Ok(self.blacklist().filter(self.parse_installed(&output)))
    }

    fn list_updates(&self, runner: &dyn CommandRunner) -> Result<Vec<UpgradablePackage>> {
        let output = runner.run(self.executable(), &self.updates_command())?;
        let blacklist = self.blacklist();
        Ok(self
            .parse_updates(&output)
            .into_iter()
            .filter(|u| blacklist.admits_update(u))
            .collect())
    }

    /// Full catalog, for backends with a [`PackageManager::catalog_command`]
    fn scan_catalog(&self, runner: &dyn CommandRunner) -> Result<Vec<Package>> {
        match self.catalog_command() {
            Some(args) => {
                let output = runner.run(self.executable(), &args)?;
                Ok(self.blacklist().filter(self.parse_packages(&output)))
            }
            None => Ok(Vec::new()),
        }
    }

    fn details(&self, runner: &dyn CommandRunner, package: &Package) -> Result<PackageDetails> {
        let mut outputs = Vec::new();
        for args in self.details_commands(package) {
            // A failing secondary command (e.g. versions) still leaves the first usable
            match runner.run(self.executable(), &args) {
                Ok(out) => outputs.push(out),
                Err(e) if outputs.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(backend = %self.backend_type(), error = %e, "details command failed");
                    outputs.push(String::new());
                }
            }
        }
        Ok(self.parse_details(package, &outputs))
    }

    // --- operations ------------------------------------------------------

    /// The package with a usable id for `kind`, re-querying the backend when
    /// the listed id was cut short. Backends that never truncate return it as is.
    fn complete_identity(&self, _runner: &dyn CommandRunner, _kind: OperationKind, package: Package) -> Package {
        package
    }

    /// Flags derived from options, custom parameters last.
    fn build_parameters(&self, kind: OperationKind, options: &InstallationOptions) -> Vec<String>;

    /// Verb and package arguments (everything except the parameters).
    fn operation_args(&self, kind: OperationKind, package: &Package, options: &InstallationOptions) -> Vec<String>;

    fn build_command(&self, kind: OperationKind, package: &Package, options: &InstallationOptions) -> OperationCommand {
        let mut args = self.operation_args(kind, package, options);
        args.extend(self.build_parameters(kind, options));
        OperationCommand {
            program: self.executable().to_string(),
            args,
            elevated: options.run_as_admin && self.capabilities().can_run_as_admin,
        }
    }

    /// Map exit status and output to a result code.
    fn classify(
        &self,
        kind: OperationKind,
        exit_code: Option<i32>,
        output: &str,
        options: &InstallationOptions,
    ) -> ResultCode;

    /// Options for a retry after [`ResultCode::NeedsBackendScopeRetry`], if this backend has one.
    fn scope_retry(&self, _options: &InstallationOptions) -> Option<InstallationOptions> {
        None
    }

    /// Progress percentage a console line implies, when the backend prints recognizable milestones.
    fn progress_hint(&self, _line: &str) -> Option<u8> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn operation_command_spawns_resolved_executable() {
        let command = OperationCommand {
            program: "npm".to_string(),
            args: strings(&["install", "left-pad"]),
            elevated: false,
        };
        let resolved = PathBuf::from("/usr/local/bin/npm.cmd");
        let cmd = command.to_command(&resolved);
        assert_eq!(cmd.get_program(), resolved.as_os_str());
        assert_eq!(cmd.get_args().count(), 2);
        assert_eq!(command.display(), "npm install left-pad");
    }
}
