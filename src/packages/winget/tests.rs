use super::*;
use crate::packages::traits::CommandRunner;
use crate::error::Result;

fn row(cells: &[&str]) -> String {
    let widths = [29, 29, 13, 13];
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        match widths.get(idx) {
            Some(w) if idx + 1 < cells.len() => line.push_str(&format!("{:<w$}", cell, w = *w)),
            _ => line.push_str(cell),
        }
    }
    line
}

fn list_output() -> String {
    [
        "\r   - \r   \\ \r   | \r".to_string() + &row(&["Name", "Id", "Version", "Source"]),
        "-".repeat(80),
        row(&["Git", "Git.Git", "2.42.0", "winget"]),
        row(&["Microsoft Edge", "Microsoft.Edge", "120.0.2210.6", ""]),
        row(&["Contoso Tool", "ARP\\Machine\\X64\\Contoso", "1.0", ""]),
    ]
    .join("\r\n")
}

fn upgrade_output() -> String {
    [
        row(&["Name", "Id", "Version", "Available", "Source"]),
        "-".repeat(90),
        row(&["Microsoft Edge", "Microsoft.Edge", "119.0.2151.9", "120.0.2210.6", "winget"]),
        row(&["Visual C++ 2015-2022 Redist…", "Microsoft.VCRedist.2015+.x64", "< 14.36", "14.38.33130", "winget"]),
        "2 upgrades available.".to_string(),
        "".to_string(),
        "The following packages have an upgrade available, but require explicit targeting for upgrade:".to_string(),
        row(&["Name", "Id", "Version", "Available", "Source"]),
        "-".repeat(90),
        row(&["Pinned App", "Pinned.App", "1.0", "2.0", "winget"]),
    ]
    .join("\n")
}

struct Canned(String);

impl CommandRunner for Canned {
    fn run(&self, _program: &str, _args: &[String]) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_installed_sources() {
    let pkgs = WingetManager::new().parse_installed(&list_output());
    assert_eq!(pkgs.len(), 3);
    assert_eq!(pkgs[0].name, "Git");
    assert_eq!(pkgs[0].id, "Git.Git");
    assert_eq!(pkgs[0].version, "2.42.0");
    assert_eq!(pkgs[0].source, "Winget: winget");
    assert_eq!(pkgs[1].source, "Winget");
    assert_eq!(pkgs[2].id, "ARP\\Machine\\X64\\Contoso");
}

#[test]
fn test_updates_across_two_tables() {
    let ups = WingetManager::new().parse_updates(&upgrade_output());
    assert_eq!(ups.len(), 3);
    assert_eq!(ups[0].package.id, "Microsoft.Edge");
    assert_eq!(ups[0].new_version, "120.0.2210.6");
    assert_eq!(ups[1].package.version, "< 14.36");
    assert_eq!(ups[1].new_version, "14.38.33130");
    assert_eq!(ups[2].package.id, "Pinned.App");
}

#[test]
fn test_listing_applies_blacklist() {
    let output = format!(
        "{}\n{}\n{}\n",
        row(&["Name", "Id", "Version", "Source"]),
        row(&["Foo", "foo", "1.0", "winget"]),
        row(&["Banner", "the", "Version", "winget"]),
    );
    let pkgs = WingetManager::new().list_installed(&Canned(output)).unwrap();
    assert_eq!(pkgs.len(), 1);
    assert_eq!(pkgs[0].id, "foo");
}

#[test]
fn test_store_is_pinned_to_its_source() {
    let store = WingetManager::pinned(Backend::MsStore, "msstore");
    let args = store.search_command("paint");
    assert!(args.ends_with(&["--source".to_string(), "msstore".to_string()]));

    let pkgs = store.parse_installed(&list_output());
    assert!(pkgs.iter().all(|p| p.source == "Microsoft Store" && p.backend == Backend::MsStore));
}

#[test]
fn test_parameter_order() {
    let opts = InstallationOptions {
        architecture: Some("x64".into()),
        version: Some("1.2.3".into()),
        scope: Some(Scope::Machine),
        skip_hash_check: true,
        custom_parameters: vec!["--override".into(), "/S".into()],
        ..Default::default()
    };
    let params = WingetManager::new().build_parameters(OperationKind::Install, &opts);
    assert_eq!(
        params,
        strings(&[
            "--accept-source-agreements",
            "--architecture",
            "x64",
            "--version",
            "1.2.3",
            "--force",
            "--scope",
            "machine",
            "--disable-interactivity",
            "--ignore-security-hash",
            "--override",
            "/S",
        ])
    );
}

#[test]
fn test_store_ignores_version_and_hash_flags() {
    let opts = InstallationOptions {
        version: Some("1.0".into()),
        skip_hash_check: true,
        ..Default::default()
    };
    let params = WingetManager::pinned(Backend::MsStore, "msstore").build_parameters(OperationKind::Install, &opts);
    assert!(!params.contains(&"--version".to_string()));
    assert!(!params.contains(&"--ignore-security-hash".to_string()));
}

#[test]
fn test_update_command_line() {
    let pkg = Package::new("Git", "Git.Git", "2.42.0", "Winget: winget", Backend::Winget);
    let cmd = WingetManager::new().build_command(OperationKind::Update, &pkg, &InstallationOptions::default());
    assert_eq!(cmd.program, "winget");
    assert_eq!(&cmd.args[..6], &strings(&["upgrade", "--id", "Git.Git", "--exact", "--include-unknown", "--accept-package-agreements"])[..]);
    assert!(!cmd.elevated);

    let cmd = WingetManager::new().build_command(
        OperationKind::Uninstall,
        &pkg,
        &InstallationOptions::default().elevated(),
    );
    assert!(cmd.elevated);
    assert_eq!(&cmd.args[..4], &strings(&["uninstall", "--id", "Git.Git", "--exact"])[..]);
}

#[test]
fn test_name_containing_id_stays_a_row() {
    let output = [
        row(&["Name", "Id", "Version", "Source"]),
        "-".repeat(80),
        row(&["Contoso Id Manager", "Contoso.IdManager", "1.0.0", "winget"]),
        row(&["Git", "Git.Git", "2.42.0", "winget"]),
        row(&["Visual Studio Code", "Microsoft.VisualStudioCode", "1.85.0", "winget"]),
    ]
    .join("\r\n");
    let pkgs = WingetManager::new().parse_installed(&output);
    let ids: Vec<&str> = pkgs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["Contoso.IdManager", "Git.Git", "Microsoft.VisualStudioCode"]);
    assert_eq!(pkgs[0].name, "Contoso Id Manager");
    assert_eq!(pkgs[2].name, "Visual Studio Code");
    assert_eq!(pkgs[2].version, "1.85.0");
}

struct Recording {
    output: String,
    calls: std::sync::Mutex<Vec<Vec<String>>>,
}

impl CommandRunner for Recording {
    fn run(&self, _program: &str, args: &[String]) -> Result<String> {
        self.calls.lock().unwrap().push(args.to_vec());
        Ok(self.output.clone())
    }
}

fn truncated() -> Package {
    Package::new(
        "Visual Studio Community 20…",
        "Microsoft.VS.Community…",
        "17.8.0",
        "Winget: winget",
        Backend::Winget,
    )
}

#[test]
fn test_truncated_id_is_looked_up_again() {
    let runner = Recording {
        output: [
            row(&["Name", "Id", "Version", "Source"]),
            "-".repeat(80),
            row(&["Visual Studio Community 2022", "Microsoft.VS.Community.2022", "17.8.0", "winget"]),
        ]
        .join("\n"),
        calls: Default::default(),
    };
    let resolved = WingetManager::new().complete_identity(&runner, OperationKind::Uninstall, truncated());
    assert_eq!(resolved.id, "Microsoft.VS.Community.2022");
    assert_eq!(resolved.name, "Visual Studio Community 20…");
    assert_eq!(
        runner.calls.lock().unwrap()[0],
        strings(&["list", "--query", "Visual Studio Community 20", "--accept-source-agreements"])
    );

    let cmd = WingetManager::new().build_command(OperationKind::Uninstall, &resolved, &InstallationOptions::default());
    assert_eq!(&cmd.args[..4], &strings(&["uninstall", "--id", "Microsoft.VS.Community.2022", "--exact"])[..]);
}

#[test]
fn test_unresolved_truncated_id_falls_back_to_name() {
    let runner = Recording {
        output: "No installed package found matching input criteria.".to_string(),
        calls: Default::default(),
    };
    let pkg = WingetManager::new().complete_identity(&runner, OperationKind::Install, truncated());
    assert_eq!(pkg.id, "Microsoft.VS.Community…");
    assert_eq!(runner.calls.lock().unwrap()[0][..2], strings(&["search", "--name"])[..]);

    let cmd = WingetManager::new().build_command(OperationKind::Install, &pkg, &InstallationOptions::default());
    assert_eq!(
        &cmd.args[..4],
        &strings(&["install", "--name", "Visual Studio Community 20", "--accept-package-agreements"])[..]
    );
}

#[test]
fn test_complete_ids_are_not_looked_up() {
    let runner = Recording {
        output: String::new(),
        calls: Default::default(),
    };
    let pkg = Package::new("Git", "Git.Git", "2.42.0", "Winget: winget", Backend::Winget);
    let same = WingetManager::new().complete_identity(&runner, OperationKind::Update, pkg.clone());
    assert_eq!(same, pkg);
    assert!(runner.calls.lock().unwrap().is_empty());
}

#[test]
fn test_classification() {
    let w = WingetManager::new();
    let opts = InstallationOptions::default();
    assert_eq!(w.classify(OperationKind::Install, Some(0), "", &opts), ResultCode::Succeeded);
    assert_eq!(
        w.classify(OperationKind::Install, Some(HASH_MISMATCH_EXIT), "", &opts),
        ResultCode::IncorrectHash
    );
    assert_eq!(
        w.classify(OperationKind::Update, Some(RESTART_REQUIRED_EXIT), "", &opts),
        ResultCode::NeedsRestart
    );
    assert_eq!(
        w.classify(OperationKind::Update, Some(1), "No applicable upgrade found.", &opts),
        ResultCode::NoApplicableUpdateFound
    );
    assert_eq!(
        w.classify(OperationKind::Uninstall, Some(1), "Uninstall failed with exit code: 1603", &opts),
        ResultCode::NeedsElevation
    );
    assert_eq!(
        w.classify(OperationKind::Install, Some(1), "Installer failed with exit code: 1603", &opts),
        ResultCode::Failed
    );
    assert_eq!(w.classify(OperationKind::Install, None, "", &opts), ResultCode::Failed);
}

const SHOW: &str = r#"Found Git [Git.Git]
Version: 2.42.0
Publisher: The Git Development Community
Author: Linus Torvalds
Description: Git is a free and open source distributed version control system.
  Fast and efficient.
Homepage: https://git-scm.com/
License: GPL-2.0
License Url: https://github.com/git-for-windows/git/blob/main/COPYING
Release Notes Url: https://github.com/git-for-windows/build-extra/blob/main/ReleaseNotes.md
Tags:
  vcs
  git
Installer:
  Installer Type: inno
  Installer Url: https://github.com/git-for-windows/git/releases/download/Git-2.42.0-64-bit.exe
  Installer SHA256: ab12cd
  Release Date: 2023-08-30
"#;

const VERSIONS: &str = "Found Git [Git.Git]\nVersion\n-------\n2.42.0\n2.41.0\n";

#[test]
fn test_details() {
    let pkg = Package::new("Git", "Git.Git", "2.42.0", "Winget: winget", Backend::Winget);
    let details = WingetManager::new().parse_details(&pkg, &[SHOW.to_string(), VERSIONS.to_string()]);
    assert_eq!(details.publisher, Detail::text("The Git Development Community"));
    assert_eq!(details.author, Detail::text("Linus Torvalds"));
    assert_eq!(
        details.description.as_known().map(String::as_str),
        Some("Git is a free and open source distributed version control system.\nFast and efficient.")
    );
    assert_eq!(details.license, Detail::text("GPL-2.0"));
    assert!(details.license_url.is_known());
    assert!(details.release_notes_url.is_known());
    assert!(!details.release_notes.is_known());
    assert_eq!(details.installer_type, Detail::text("inno"));
    assert_eq!(details.installer_hash, Detail::text("ab12cd"));
    assert_eq!(details.update_date, Detail::text("2023-08-30"));
    assert_eq!(details.tags, vec!["vcs", "git"]);
    assert_eq!(details.versions, vec!["2.42.0", "2.41.0"]);
    assert_eq!(
        details.manifest_url,
        Detail::text("https://github.com/microsoft/winget-pkgs/tree/master/manifests/g/Git/Git")
    );
}

#[test]
fn test_details_for_unknown_package_are_default() {
    let pkg = Package::new("Nope", "No.Pe", "1", "Winget", Backend::Winget);
    let details = WingetManager::new().parse_details(
        &pkg,
        &["No package found matching input criteria.".to_string()],
    );
    assert!(!details.publisher.is_known());
    assert!(details.versions.is_empty());
    assert_eq!(details.scopes.len(), 2);
}

#[test]
fn test_progress_hints() {
    let w = WingetManager::new();
    assert_eq!(w.progress_hint("Successfully verified installer hash"), Some(50));
    assert_eq!(w.progress_hint("Successfully installed"), Some(100));
    assert_eq!(w.progress_hint("random"), None);
}
