//! Install, update and uninstall
//!
//! One invocation queues exactly one operation. Saved per-package options are
//! loaded first, then the command-line flags are applied on top.

use crate::cli::args::OperationArgs;
use crate::commands::Engine;
use crate::core::capabilities::Capabilities;
use crate::core::options::InstallationOptions;
use crate::core::types::{OperationKind, Package};
use crate::error::{Result, UnipkgError};
use crate::operations::{Operation, OperationContext, OperationOutcome, ProcessDriver, ResultCode, Ticket};
use crate::traits::NullObserver;
use crate::ui::{self as output, ConsoleObserver};
use crate::utils::machine_output::{self, OutputFormat};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Serialize)]
struct OperationReport {
    ticket: Ticket,
    kind: OperationKind,
    package: Package,
    options: InstallationOptions,
    outcome: OperationOutcome,
}

pub struct OperateOptions<'a> {
    pub kind: OperationKind,
    pub args: &'a OperationArgs,
    pub verbose: bool,
    pub format: OutputFormat,
}

pub fn run(opts: OperateOptions<'_>) -> Result<()> {
    let args = opts.args;
    let engine = Engine::load(Some(args.backend))?;
    let manager = engine.catalog.manager(args.backend).map_err(|_| {
        UnipkgError::ConfigError(format!(
            "{} is disabled (setting Disable{})",
            args.backend,
            args.backend.key()
        ))
    })?;

    let (package, update_target) = resolve_package(&engine, opts.kind, args);
    let package = engine.catalog.complete_identity(opts.kind, package);
    let mut options = InstallationOptions::load_for(args.backend, &args.id).unwrap_or_else(|e| {
        output::warning(&format!("Ignoring saved options for {}: {}", args.id, e));
        InstallationOptions::default()
    });
    apply_args(&mut options, args)?;
    if args.save {
        options.save_for(args.backend, &args.id)?;
        output::info(&format!("Saved options for {}", args.id));
    }

    for flag in unsupported_flags(&manager.capabilities(), &options) {
        output::warning(&format!("{} does not support {}; ignoring it", args.backend, flag));
    }
    if let Some(version) = &update_target {
        options = options.targeting(version);
    }

    // Ctrl-C cancels whichever operation is current
    let current: Arc<Mutex<Option<Arc<AtomicBool>>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&current);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        output::warning("Cancelling...");
        if let Some(cancel) = slot.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            cancel.store(true, Ordering::SeqCst);
        }
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    let label = format!("{} {}", verb(opts.kind), package.id);
    let run = |options: InstallationOptions| {
        let context = OperationContext {
            scheduler: Arc::clone(&engine.scheduler),
            settings: Arc::clone(&engine.settings),
            collections: Arc::clone(&engine.collections),
            observer: Arc::new(ConsoleObserver::new(&label, opts.verbose)),
            log: engine.log.clone(),
        };
        let mut operation = Operation::enqueue(context, Arc::clone(&manager), opts.kind, package.clone(), options);
        *current.lock().unwrap_or_else(PoisonError::into_inner) = Some(operation.cancel_handle());

        let driver = ProcessDriver::new(Arc::clone(&manager));
        let outcome = operation.run(&driver);
        (operation.ticket(), operation.options().clone(), outcome)
    };

    let (mut ticket, mut final_options, mut outcome) = run(options);
    if offer_hash_skip(&outcome, &final_options, &manager.capabilities(), opts.format)
        && output::prompt_yes_no("Retry while skipping the installer hash check?")
    {
        (ticket, final_options, outcome) = run(final_options.skipping_hash());
    }

    if opts.format.is_machine() {
        let errors = if outcome.is_success() {
            Vec::new()
        } else {
            vec![outcome.summary()]
        };
        machine_output::emit_v1(
            &opts.kind.to_string(),
            OperationReport {
                ticket,
                kind: opts.kind,
                package,
                options: final_options,
                outcome: outcome.clone(),
            },
            Vec::new(),
            errors,
            opts.format,
        )?;
    }

    if outcome.cancelled {
        return Err(UnipkgError::Interrupted);
    }
    if !outcome.is_success() {
        if outcome.code == ResultCode::IncorrectHash {
            output::info("The installer hash did not match. Re-run with --skip-hash to install anyway.");
        }
        return Err(UnipkgError::PackageManagerError(format!("{}: {}", label, outcome.summary())));
    }
    if outcome.code == ResultCode::NeedsRestart {
        output::warning("Restart the system to finish this operation");
    }
    Ok(())
}

/// Skipping the integrity check is only ever offered interactively.
fn offer_hash_skip(
    outcome: &OperationOutcome,
    options: &InstallationOptions,
    capabilities: &Capabilities,
    format: OutputFormat,
) -> bool {
    outcome.code == ResultCode::IncorrectHash
        && !outcome.cancelled
        && !options.skip_hash_check
        && capabilities.can_skip_integrity_checks
        && !format.is_machine()
        && io::stdin().is_terminal()
}

/// Requested options the backend cannot honour.
fn unsupported_flags(caps: &Capabilities, options: &InstallationOptions) -> Vec<&'static str> {
    [
        (options.version.is_some() && !caps.supports_custom_versions, "--version"),
        (options.architecture.is_some() && !caps.supports_custom_architectures, "--arch"),
        (options.scope.is_some() && !caps.supports_custom_scopes, "--scope"),
        (options.interactive && !caps.can_run_interactively, "--interactive"),
        (options.skip_hash_check && !caps.can_skip_integrity_checks, "--skip-hash"),
        (options.run_as_admin && !caps.can_run_as_admin, "--admin"),
        (options.remove_data_on_uninstall && !caps.can_remove_data_on_uninstall, "--remove-data"),
        (options.pre_release && !caps.supports_pre_release, "--pre-release"),
    ]
    .into_iter()
    .filter_map(|(unsupported, flag)| unsupported.then_some(flag))
    .collect()
}

fn verb(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Install => "Installing",
        OperationKind::Update => "Updating",
        OperationKind::Uninstall => "Uninstalling",
    }
}

/// The package as the backend lists it, or a bare one built from the id.
///
/// Updates also return the version the updates listing offered.
fn resolve_package(engine: &Engine, kind: OperationKind, args: &OperationArgs) -> (Package, Option<String>) {
    let matches = |p: &Package| p.id.eq_ignore_ascii_case(&args.id);
    let found = match kind {
        OperationKind::Install => engine
            .catalog
            .search(&args.id, &NullObserver)
            .into_iter()
            .find(matches)
            .map(|p| (p, None)),
        OperationKind::Update => engine
            .catalog
            .list_updates(&NullObserver)
            .into_iter()
            .find(|u| matches(&u.package))
            .map(|u| (u.package, Some(u.new_version))),
        OperationKind::Uninstall => engine
            .catalog
            .list_installed(&NullObserver)
            .into_iter()
            .find(matches)
            .map(|p| (p, None)),
    };

    found.unwrap_or_else(|| {
        tracing::debug!(id = %args.id, "package not listed, using bare id");
        (
            Package::new(&args.id, &args.id, "", args.backend.display_name(), args.backend),
            None,
        )
    })
}

/// Overlay command-line flags onto saved options.
///
/// A single custom argument containing whitespace is split with shell
/// quoting rules; several arguments are passed through as given.
fn apply_args(options: &mut InstallationOptions, args: &OperationArgs) -> Result<()> {
    if args.version.is_some() {
        options.version = args.version.clone();
    }
    if args.architecture.is_some() {
        options.architecture = args.architecture.clone();
    }
    if args.scope.is_some() {
        options.scope = args.scope;
    }
    options.interactive |= args.interactive;
    options.skip_hash_check |= args.skip_hash;
    options.run_as_admin |= args.admin;
    options.remove_data_on_uninstall |= args.remove_data;
    options.pre_release |= args.pre_release;

    options.custom_parameters = match args.custom.as_slice() {
        [] => options.custom_parameters.clone(),
        [single] if single.contains(char::is_whitespace) => InstallationOptions::parse_custom_parameters(single)?,
        many => many.to_vec(),
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Backend, Scope};

    fn args(custom: &[&str]) -> OperationArgs {
        OperationArgs {
            id: "Git.Git".to_string(),
            backend: Backend::Winget,
            version: None,
            architecture: None,
            scope: None,
            interactive: false,
            skip_hash: false,
            admin: false,
            remove_data: false,
            pre_release: false,
            save: false,
            custom: custom.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn flags_override_saved_options() {
        let mut options = InstallationOptions {
            version: Some("2.40.0".into()),
            scope: Some(Scope::User),
            custom_parameters: vec!["--saved".into()],
            ..Default::default()
        };
        let mut cli = args(&[]);
        cli.version = Some("2.43.0".into());
        cli.skip_hash = true;

        apply_args(&mut options, &cli).unwrap();

        assert_eq!(options.version.as_deref(), Some("2.43.0"));
        assert_eq!(options.scope, Some(Scope::User));
        assert!(options.skip_hash_check);
        assert_eq!(options.custom_parameters, vec!["--saved"]);
    }

    #[test]
    fn single_quoted_custom_string_is_split() {
        let mut options = InstallationOptions::default();
        apply_args(&mut options, &args(&["--location 'D:\\My Apps'"])).unwrap();
        assert_eq!(options.custom_parameters, vec!["--location", "D:\\My Apps"]);
    }

    #[test]
    fn separate_custom_arguments_pass_through() {
        let mut options = InstallationOptions::default();
        apply_args(&mut options, &args(&["--location", "D:\\My Apps"])).unwrap();
        assert_eq!(options.custom_parameters, vec!["--location", "D:\\My Apps"]);
    }

    #[test]
    fn unsupported_flags_are_reported() {
        let caps = Capabilities {
            supports_custom_versions: true,
            ..Capabilities::NONE
        };
        let options = InstallationOptions {
            version: Some("1.0".into()),
            architecture: Some("arm64".into()),
            run_as_admin: true,
            ..Default::default()
        };
        assert_eq!(unsupported_flags(&caps, &options), vec!["--arch", "--admin"]);
    }

    #[test]
    fn hash_skip_is_never_offered_to_machine_output() {
        let outcome = OperationOutcome {
            code: ResultCode::IncorrectHash,
            exit_code: Some(1),
            output: String::new(),
            cancelled: false,
            attempts: 1,
        };
        let caps = Capabilities {
            can_skip_integrity_checks: true,
            ..Capabilities::NONE
        };
        let options = InstallationOptions::default();
        assert!(!offer_hash_skip(&outcome, &options, &caps, OutputFormat::Json));
        assert!(!offer_hash_skip(&outcome, &options.skipping_hash(), &caps, OutputFormat::Table));
    }

    #[test]
    fn unbalanced_custom_string_is_rejected() {
        let mut options = InstallationOptions::default();
        assert!(apply_args(&mut options, &args(&["--location 'D:\\Apps"])).is_err());
    }
}
