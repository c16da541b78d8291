//! Keys understood by the settings collaborator.

use crate::core::types::Backend;

pub const ALLOW_PARALLEL_INSTALLS: &str = "AllowParallelInstalls";
pub const DO_CACHE_ADMIN_RIGHTS: &str = "DoCacheAdminRights";

pub fn always_elevate(backend: Backend) -> String {
    format!("AlwaysElevate{}", backend.key())
}

pub fn disable(backend: Backend) -> String {
    format!("Disable{}", backend.key())
}

/// Whether `key` is one the engine reads.
pub fn is_known(key: &str) -> bool {
    key == ALLOW_PARALLEL_INSTALLS
        || key == DO_CACHE_ADMIN_RIGHTS
        || Backend::ALL
            .iter()
            .any(|b| key == always_elevate(*b) || key == disable(*b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_keys_are_known() {
        assert!(is_known("AlwaysElevateScoop"));
        assert!(is_known("DisableChocolatey"));
        assert!(is_known(ALLOW_PARALLEL_INSTALLS));
        assert!(!is_known("AlwaysElevateApt"));
    }
}
