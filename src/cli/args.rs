use crate::core::types::{Backend, Scope};
use crate::utils::machine_output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = "unipkg",
    about = "One front end for winget, scoop, chocolatey, dotnet tools, npm, pip and the Microsoft Store",
    long_about = "Lists, searches, installs, updates and removes packages through winget, the Microsoft Store, \
scoop, chocolatey, dotnet tools, npm and pip, running at most one mutating operation at a time.",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// Verbose output (debug logs, full backend output)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

fn parse_backend(value: &str) -> Result<Backend, String> {
    value.parse()
}

fn parse_scope(value: &str) -> Result<Scope, String> {
    value.parse()
}

#[derive(Args, Debug, Clone, Default)]
pub struct BackendFilter {
    /// Only this backend (winget, msstore, scoop, choco, dotnet, npm, pip)
    #[arg(short = 'b', long, value_parser = parse_backend)]
    pub backend: Option<Backend>,
}

#[derive(Args, Debug, Clone)]
pub struct OperationArgs {
    /// Package id as listed by the backend
    pub id: String,

    /// Backend owning the package
    #[arg(short = 'b', long, value_parser = parse_backend)]
    pub backend: Backend,

    /// Install or pin this version
    #[arg(long, help_heading = "Options")]
    pub version: Option<String>,

    /// Target architecture (x64, x86, arm64)
    #[arg(long = "arch", help_heading = "Options")]
    pub architecture: Option<String>,

    /// Installation scope
    #[arg(long, value_parser = parse_scope, help_heading = "Options")]
    pub scope: Option<Scope>,

    /// Let the installer show its own UI
    #[arg(long, help_heading = "Options")]
    pub interactive: bool,

    /// Skip the installer integrity check
    #[arg(long, help_heading = "Options")]
    pub skip_hash: bool,

    /// Run elevated from the first attempt
    #[arg(long, help_heading = "Options")]
    pub admin: bool,

    /// Remove user data when uninstalling
    #[arg(long, help_heading = "Options")]
    pub remove_data: bool,

    /// Allow pre-release versions
    #[arg(long, help_heading = "Options")]
    pub pre_release: bool,

    /// Save these options as the package's defaults
    #[arg(long, help_heading = "Options")]
    pub save: bool,

    /// Extra parameters passed verbatim to the backend
    #[arg(last = true, value_name = "CUSTOM")]
    pub custom: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List installed packages
    List(BackendFilter),

    /// List packages with an available update
    Updates(BackendFilter),

    /// Search every backend for packages
    Search {
        query: String,

        #[command(flatten)]
        filter: BackendFilter,
    },

    /// Show package details
    Show {
        id: String,

        #[arg(short = 'b', long, value_parser = parse_backend)]
        backend: Backend,

        /// Look up the installer size over the network
        #[arg(long)]
        size: bool,
    },

    /// Install a package
    Install(OperationArgs),

    /// Update a package
    Update(OperationArgs),

    /// Uninstall a package
    Uninstall(OperationArgs),

    /// Print the operation log
    History,

    /// Read or change engine settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print one setting
    Get { key: String },

    /// Change one setting
    Set { key: String, value: String },

    /// Print every setting
    List,
}

#[cfg(test)]
mod tests;
