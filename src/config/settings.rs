//! Settings Module
//!
//! Engine settings live in `settings.kdl` in the per-user config directory:
//!
//! ```kdl
//! settings {
//!     AllowParallelInstalls "true"
//!     DisableChocolatey "true"
//! }
//! ```
//!
//! Every recognised key is a boolean. Unknown keys in the file are kept
//! but ignored by the engine.

use crate::constants::settings_keys;
use crate::error::{Result, UnipkgError};
use crate::traits::SettingsStore;
use crate::utils::{fs as ufs, paths};
use kdl::{KdlDocument, KdlValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const BLOCK_NAME: &str = "settings";
const TRUE_VALUES: &[&str] = &["true", "false", "1", "0", "yes", "no", "on", "off"];

/// Settings manager backed by a KDL file
#[derive(Debug)]
pub struct Settings {
    settings_file: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl Settings {
    /// Load settings from the per-user file; an absent file means no settings.
    pub fn load() -> Result<Self> {
        Self::load_from(paths::settings_file()?)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let settings_file = path.into();
        let values = if settings_file.exists() {
            let content = fs::read_to_string(&settings_file).map_err(|e| UnipkgError::IoError {
                path: settings_file.clone(),
                source: e,
            })?;
            parse_settings(&content, &settings_file)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            settings_file,
            values: Mutex::new(values),
        })
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> &Path {
        &self.settings_file
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    /// Validate, update and save one setting
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        validate_value(key, value)?;
        self.values().insert(key.to_string(), value.trim().to_lowercase());
        self.save()
    }

    /// Get all settings, sorted by key
    pub fn all(&self) -> Vec<(String, String)> {
        self.values()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn save(&self) -> Result<()> {
        let content = render_settings(&self.values());
        ufs::write_atomic(&self.settings_file, content.as_bytes())
    }
}

impl SettingsStore for Settings {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn set_string(&self, key: &str, value: &str) {
        self.values().insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            tracing::warn!(key, error = %e, "could not save settings");
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if settings_keys::is_known(key) {
        Ok(())
    } else {
        Err(UnipkgError::ConfigError(format!(
            "Unknown setting: '{}'. Valid settings: {}, {}, AlwaysElevate<Backend>, Disable<Backend>",
            key,
            settings_keys::ALLOW_PARALLEL_INSTALLS,
            settings_keys::DO_CACHE_ADMIN_RIGHTS
        )))
    }
}

fn validate_value(key: &str, value: &str) -> Result<()> {
    if TRUE_VALUES.contains(&value.trim().to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(UnipkgError::ConfigError(format!(
            "Invalid value for '{}': '{}'. Valid: true, false",
            key, value
        )))
    }
}

fn value_text(value: &KdlValue) -> Option<String> {
    match value {
        KdlValue::String(s) => Some(s.clone()),
        KdlValue::Bool(b) => Some(b.to_string()),
        KdlValue::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Parse the `settings { key "value" }` block
fn parse_settings(content: &str, path: &Path) -> Result<BTreeMap<String, String>> {
    let doc: KdlDocument = content.parse().map_err(|e: kdl::KdlError| UnipkgError::ParseError {
        file: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut values = BTreeMap::new();
    for block in doc.nodes().iter().filter(|n| n.name().value() == BLOCK_NAME) {
        let Some(children) = block.children() else {
            continue;
        };
        for node in children.nodes() {
            let key = node.name().value();
            match node.entries().first().and_then(|e| value_text(e.value())) {
                Some(value) => {
                    values.insert(key.to_string(), value);
                }
                None => tracing::warn!(key, "setting without a value ignored"),
            }
        }
    }
    Ok(values)
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn render_settings(values: &BTreeMap<String, String>) -> String {
    let mut content = String::from("// unipkg settings\n// Managed by `unipkg settings set`\n\nsettings {\n");
    for (key, value) in values {
        content.push_str(&format!("    {} {}\n", key, quote(value)));
    }
    content.push_str("}\n");
    content
}
