use super::*;
use clap::{CommandFactory, Parser};

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parser_accepts_install_with_options_and_custom_parameters() {
    let parsed = Cli::try_parse_from([
        "unipkg",
        "install",
        "Git.Git",
        "--backend",
        "winget",
        "--version",
        "2.43.0",
        "--scope",
        "machine",
        "--skip-hash",
        "--",
        "--location",
        "D:\\Apps",
    ])
    .expect("install should parse");

    let Command::Install(args) = parsed.command else {
        panic!("expected install");
    };
    assert_eq!(args.id, "Git.Git");
    assert_eq!(args.backend, Backend::Winget);
    assert_eq!(args.version.as_deref(), Some("2.43.0"));
    assert_eq!(args.scope, Some(Scope::Machine));
    assert!(args.skip_hash);
    assert_eq!(args.custom, vec!["--location", "D:\\Apps"]);
}

#[test]
fn parser_requires_backend_for_operations() {
    assert!(Cli::try_parse_from(["unipkg", "uninstall", "requests"]).is_err());
}

#[test]
fn parser_rejects_unknown_backend() {
    assert!(Cli::try_parse_from(["unipkg", "list", "--backend", "apt"]).is_err());
}

#[test]
fn backend_aliases_are_accepted() {
    let parsed = Cli::try_parse_from(["unipkg", "updates", "-b", "choco"]).expect("alias parses");
    let Command::Updates(filter) = parsed.command else {
        panic!("expected updates");
    };
    assert_eq!(filter.backend, Some(Backend::Chocolatey));
}

#[test]
fn global_flags_apply_after_subcommand() {
    let parsed = Cli::try_parse_from(["unipkg", "search", "git", "--format", "json", "-v"]).expect("parses");
    assert!(parsed.global.verbose);
    assert_eq!(parsed.global.format, OutputFormat::Json);
}
