//! Per-operation installation options
//!
//! An `InstallationOptions` value is created once per operation. Retries never
//! mutate it in place: `elevated()` and `with_extra_parameter()` return the next
//! value, which the orchestrator threads through its state machine.

use crate::core::types::{Backend, Scope};
use crate::error::{Result, UnipkgError};
use crate::utils::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationOptions {
    pub skip_hash_check: bool,
    pub interactive: bool,
    pub run_as_admin: bool,
    pub version: Option<String>,
    pub architecture: Option<String>,
    pub scope: Option<Scope>,
    pub custom_parameters: Vec<String>,
    pub remove_data_on_uninstall: bool,
    pub pre_release: bool,
    /// Version the updates listing offered; known only for updates and never saved
    #[serde(skip)]
    pub update_target: Option<String>,
}

impl InstallationOptions {
    /// Same options, run elevated. Elevation is never revoked.
    pub fn elevated(&self) -> Self {
        Self {
            run_as_admin: true,
            ..self.clone()
        }
    }

    /// Same options with one more custom parameter, unless already present.
    pub fn with_extra_parameter(&self, parameter: &str) -> Self {
        let mut next = self.clone();
        if !next.custom_parameters.iter().any(|p| p == parameter) {
            next.custom_parameters.push(parameter.to_string());
        }
        next
    }

    /// Same options aimed at the version an updates listing reported.
    pub fn targeting(&self, version: &str) -> Self {
        Self {
            update_target: Some(version.to_string()),
            ..self.clone()
        }
    }

    /// Same options with integrity checks skipped (explicit user action only).
    pub fn skipping_hash(&self) -> Self {
        Self {
            skip_hash_check: true,
            ..self.clone()
        }
    }

    /// Parse a free-form parameter string with shell quoting rules.
    pub fn parse_custom_parameters(raw: &str) -> Result<Vec<String>> {
        shlex::split(raw).ok_or_else(|| {
            UnipkgError::ConfigError(format!("Unbalanced quotes in custom parameters: {}", raw))
        })
    }

    /// Saved options for a package, or defaults when none were saved.
    pub fn load_for(backend: Backend, id: &str) -> Result<Self> {
        Self::load_from(&options_file(backend, id)?)
    }

    pub fn save_for(&self, backend: Backend, id: &str) -> Result<()> {
        self.save_to(&options_file(backend, id)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| UnipkgError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        crate::utils::fs::write_atomic(path, content.as_bytes())
    }
}

fn options_file(backend: Backend, id: &str) -> Result<PathBuf> {
    let safe_id: String = id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    Ok(paths::options_dir()?.join(format!("{}.{}.json", backend.key(), safe_id)))
}
