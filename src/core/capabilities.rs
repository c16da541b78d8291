/// Static per-backend feature flags, consulted instead of matching on backend identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_run_as_admin: bool,
    pub can_skip_integrity_checks: bool,
    pub can_run_interactively: bool,
    pub can_remove_data_on_uninstall: bool,
    pub supports_custom_versions: bool,
    pub supports_custom_architectures: bool,
    pub supports_custom_scopes: bool,
    pub supports_pre_release: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        can_run_as_admin: false,
        can_skip_integrity_checks: false,
        can_run_interactively: false,
        can_remove_data_on_uninstall: false,
        supports_custom_versions: false,
        supports_custom_architectures: false,
        supports_custom_scopes: false,
        supports_pre_release: false,
    };

    /// Human-readable list of enabled flags, for `show` output.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.can_run_as_admin, "admin"),
            (self.can_skip_integrity_checks, "skip-hash"),
            (self.can_run_interactively, "interactive"),
            (self.can_remove_data_on_uninstall, "remove-data"),
            (self.supports_custom_versions, "version"),
            (self.supports_custom_architectures, "architecture"),
            (self.supports_custom_scopes, "scope"),
            (self.supports_pre_release, "pre-release"),
        ]
        .into_iter()
        .filter_map(|(enabled, label)| enabled.then_some(label))
        .collect()
    }
}
