//! Settings Command
//!
//! Read and change engine settings.

use crate::cli::args::SettingsCommand;
use crate::config::settings::Settings;
use crate::constants::settings_keys;
use crate::core::types::Backend;
use crate::error::{Result, UnipkgError};
use crate::ui as output;
use crate::utils::machine_output::{self, OutputFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SettingOut {
    key: String,
    value: Option<String>,
}

/// Run the settings command
pub fn run(command: &SettingsCommand, format: OutputFormat) -> Result<()> {
    let settings = Settings::load()?;
    match command {
        SettingsCommand::Set { key, value } => {
            settings.set(key, value)?;
            if format.is_machine() {
                return machine_output::emit_v1(
                    "settings set",
                    SettingOut {
                        key: key.clone(),
                        value: settings.get(key),
                    },
                    Vec::new(),
                    Vec::new(),
                    format,
                );
            }
            output::success(&format!("Set {} = {}", key, value.trim().to_lowercase()));
        }
        SettingsCommand::Get { key } => {
            if !settings_keys::is_known(key) {
                return Err(UnipkgError::ConfigError(format!("Unknown setting: '{}'", key)));
            }
            let value = settings.get(key);
            if format.is_machine() {
                return machine_output::emit_v1(
                    "settings get",
                    SettingOut {
                        key: key.clone(),
                        value,
                    },
                    Vec::new(),
                    Vec::new(),
                    format,
                );
            }
            match value {
                Some(value) => println!("{} = {}", key, value),
                None => println!("{} = false (default)", key),
            }
        }
        SettingsCommand::List => {
            let all: Vec<SettingOut> = settings
                .all()
                .into_iter()
                .map(|(key, value)| SettingOut {
                    key,
                    value: Some(value),
                })
                .collect();
            if format.is_machine() {
                return machine_output::emit_v1("settings list", all, Vec::new(), Vec::new(), format);
            }
            show_all_settings(&all);
        }
    }

    Ok(())
}

fn show_all_settings(all: &[SettingOut]) {
    output::header("Current Settings");

    if all.is_empty() {
        println!("  (none set, everything defaults to false)");
    }
    for setting in all {
        println!("  {}: {}", setting.key, setting.value.as_deref().unwrap_or("false"));
    }

    println!();
    output::info("Valid settings (true/false):");
    println!("  {}", settings_keys::ALLOW_PARALLEL_INSTALLS);
    println!("  {}", settings_keys::DO_CACHE_ADMIN_RIGHTS);
    let keys: Vec<&str> = Backend::ALL.iter().map(|b| b.key()).collect();
    println!("  AlwaysElevate<Backend>, Disable<Backend>  ({})", keys.join(", "));
}
