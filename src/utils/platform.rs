use std::ffi::OsStr;
use std::process::Command;

/// Program wrapping a command to run it elevated.
///
/// - Unix: `sudo`
/// - Windows: `gsudo`
pub fn elevation_helper() -> &'static str {
    if cfg!(windows) { "gsudo" } else { "sudo" }
}

/// Build a direct program invocation in a platform-aware way.
///
/// `program` should be the resolved path: on Windows `Command` only appends
/// `.exe`, so `.cmd`/`.ps1` shims are not found by bare name. Elevated runs
/// become `<helper> program args...`.
pub fn build_program_command(program: impl AsRef<OsStr>, args: &[String], elevated: bool) -> Command {
    let program = program.as_ref();
    let mut cmd = if elevated {
        let mut c = Command::new(elevation_helper());
        c.arg(program);
        c
    } else {
        Command::new(program)
    };
    cmd.args(args);
    cmd
}

/// Command that turns on the elevation helper's credential cache for this process.
pub fn cache_admin_rights_command() -> Command {
    if cfg!(windows) {
        let mut c = Command::new("gsudo");
        c.args(["cache", "on", "--pid", &std::process::id().to_string(), "-d", "-1"]);
        c
    } else {
        let mut c = Command::new("sudo");
        c.arg("-v");
        c
    }
}

/// Render a command line the way a user would type it (for logs and history).
pub fn display_command_line(program: &str, args: &[String], elevated: bool) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(args.len() + 2);
    if elevated {
        parts.push(elevation_helper().to_string());
    }
    parts.push(program.to_string());
    parts.extend(args.iter().map(|a| {
        if a.contains(' ') {
            format!("\"{}\"", a)
        } else {
            a.clone()
        }
    }));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_program_non_elevated_works() {
        let cmd = build_program_command("echo", &["ok".to_string()], false);
        assert_eq!(cmd.get_program(), "echo");
        assert_eq!(cmd.get_args().count(), 1);
    }

    #[test]
    fn build_program_elevated_wraps_with_helper() {
        let cmd = build_program_command("scoop", &["install".to_string()], true);
        assert_eq!(cmd.get_program(), elevation_helper());
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["scoop", "install"]);
    }

    #[test]
    fn resolved_shim_path_is_spawned_as_given() {
        let shim = std::path::Path::new("/opt/scoop/shims/scoop.cmd");
        let cmd = build_program_command(shim, &["install".to_string()], false);
        assert_eq!(cmd.get_program(), shim.as_os_str());

        let cmd = build_program_command(shim, &["install".to_string()], true);
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, [shim.as_os_str(), OsStr::new("install")]);
    }

    #[test]
    fn display_quotes_spaced_args() {
        let line = display_command_line("winget", &["--location".into(), "C:\\Program Files".into()], false);
        assert_eq!(line, "winget --location \"C:\\Program Files\"");
    }
}
