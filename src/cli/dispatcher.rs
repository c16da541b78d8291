//! Command dispatcher
//!
//! Routes CLI commands to their appropriate handlers.

use crate::cli::args::{Cli, Command};
use crate::commands;
use crate::core::types::OperationKind;
use crate::error::{Result, UnipkgError};

/// Dispatch the parsed CLI command to the appropriate handler
pub fn dispatch(args: &Cli) -> Result<()> {
    validate_machine_output_contract(args)?;
    let format = args.global.format;

    match &args.command {
        Command::List(filter) => commands::list::run_installed(filter, format),

        Command::Updates(filter) => commands::list::run_updates(filter, format),

        Command::Search { query, filter } => commands::search::run(commands::search::SearchOptions {
            query: query.clone(),
            backend: filter.backend,
            format,
        }),

        Command::Show { id, backend, size } => commands::search::run_show(commands::search::ShowOptions {
            id: id.clone(),
            backend: *backend,
            fetch_size: *size,
            format,
        }),

        Command::Install(op) => operate(args, OperationKind::Install, op),
        Command::Update(op) => operate(args, OperationKind::Update, op),
        Command::Uninstall(op) => operate(args, OperationKind::Uninstall, op),

        Command::History => commands::history::run(format),

        Command::Settings { command } => commands::settings::run(command, format),

        Command::Completions { shell } => commands::completions::run(*shell),
    }
}

fn operate(args: &Cli, kind: OperationKind, op: &crate::cli::args::OperationArgs) -> Result<()> {
    commands::operate::run(commands::operate::OperateOptions {
        kind,
        args: op,
        verbose: args.global.verbose,
        format: args.global.format,
    })
}

fn validate_machine_output_contract(args: &Cli) -> Result<()> {
    if args.global.format.is_machine() && matches!(args.command, Command::Completions { .. }) {
        return Err(UnipkgError::Other(
            "completions prints a shell script and does not support --format json|yaml".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn completions_reject_machine_format() {
        let cli = Cli::try_parse_from(["unipkg", "completions", "bash", "--format", "json"]).unwrap();
        assert!(validate_machine_output_contract(&cli).is_err());
    }

    #[test]
    fn listings_accept_machine_format() {
        let cli = Cli::try_parse_from(["unipkg", "list", "--format", "yaml"]).unwrap();
        assert!(validate_machine_output_contract(&cli).is_ok());
    }
}
