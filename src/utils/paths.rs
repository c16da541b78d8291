use crate::constants::{OPERATION_LOG_FILE_NAME, PROJECT_NAME, PROJECT_ORG, PROJECT_QUALIFIER, SETTINGS_FILE_NAME};
use crate::error::{Result, UnipkgError};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides every per-user directory (used by tests and portable installs)
pub const HOME_OVERRIDE_ENV: &str = "UNIPKG_HOME";

fn override_root() -> Option<PathBuf> {
    std::env::var_os(HOME_OVERRIDE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORG, PROJECT_NAME)
        .ok_or_else(|| UnipkgError::PathError("Could not determine user directories".to_string()))
}

pub fn config_dir() -> Result<PathBuf> {
    match override_root() {
        Some(root) => Ok(root.join("config")),
        None => Ok(project_dirs()?.config_dir().to_path_buf()),
    }
}

pub fn data_dir() -> Result<PathBuf> {
    match override_root() {
        Some(root) => Ok(root.join("data")),
        None => Ok(project_dirs()?.data_dir().to_path_buf()),
    }
}

pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE_NAME))
}

/// Backend catalog caches
pub fn cache_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("cache"))
}

/// Saved per-package installation options
pub fn options_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("options"))
}

pub fn operation_log_file() -> Result<PathBuf> {
    Ok(data_dir()?.join(OPERATION_LOG_FILE_NAME))
}
