use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Supported backends.
// To add a new package manager, add a variant here and update:
// - Backend::ALL / Backend::key() / Backend::display_name()
// - BackendRegistry::register_defaults()
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Winget,
    Scoop,
    Chocolatey,
    Dotnet,
    Npm,
    Pip,
    MsStore,
}

impl Backend {
    pub const ALL: [Backend; 7] = [
        Backend::Winget,
        Backend::Scoop,
        Backend::Chocolatey,
        Backend::Dotnet,
        Backend::Npm,
        Backend::Pip,
        Backend::MsStore,
    ];

    /// Stable key used in settings names and cache file names
    pub fn key(&self) -> &'static str {
        match self {
            Self::Winget => "Winget",
            Self::Scoop => "Scoop",
            Self::Chocolatey => "Chocolatey",
            Self::Dotnet => "Dotnet",
            Self::Npm => "Npm",
            Self::Pip => "Pip",
            Self::MsStore => "MsStore",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Winget => "Winget",
            Self::Scoop => "Scoop",
            Self::Chocolatey => "Chocolatey",
            Self::Dotnet => ".NET Tool",
            Self::Npm => "Npm",
            Self::Pip => "Pip",
            Self::MsStore => "Microsoft Store",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winget" => Ok(Self::Winget),
            "scoop" => Ok(Self::Scoop),
            "choco" | "chocolatey" => Ok(Self::Chocolatey),
            "dotnet" | ".net" | ".net tool" => Ok(Self::Dotnet),
            "npm" => Ok(Self::Npm),
            "pip" => Ok(Self::Pip),
            "msstore" | "store" | "microsoft store" => Ok(Self::MsStore),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Opaque token owned by the UI; the engine only carries it around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UiHandle(pub u64);

/// Identity of a package: name is cosmetic and excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageKey {
    pub id: String,
    pub source: String,
    pub backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub id: String,
    pub version: String,
    pub source: String,
    pub backend: Backend,
    #[serde(skip)]
    pub ui_handle: Option<UiHandle>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<String>,
        backend: Backend,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            version: version.into(),
            source: source.into(),
            backend,
            ui_handle: None,
        }
    }

    pub fn key(&self) -> PackageKey {
        PackageKey {
            id: self.id.clone(),
            source: self.source.clone(),
            backend: self.backend,
        }
    }

    pub fn with_ui_handle(mut self, handle: UiHandle) -> Self {
        self.ui_handle = Some(handle);
        self
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.id, self.version)
    }
}

/// Produced only by update discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradablePackage {
    pub package: Package,
    pub new_version: String,
    /// The package as it will look once upgraded
    pub target: Package,
}

impl UpgradablePackage {
    pub fn new(package: Package, new_version: impl Into<String>) -> Self {
        let new_version = new_version.into();
        let mut target = package.clone();
        target.version = new_version.clone();
        Self {
            package,
            new_version,
            target,
        }
    }

    pub fn key(&self) -> PackageKey {
        self.package.key()
    }
}

/// A details field: either known, or the explicit "Not available" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Detail<T> {
    #[default]
    Unknown,
    Known(T),
}

impl<T> Detail<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

impl Detail<String> {
    /// Empty or whitespace-only text stays unknown.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Unknown
        } else {
            Self::Known(trimmed.to_string())
        }
    }

    /// Appends a continuation line, turning an unknown field into a known one.
    pub fn append_line(&mut self, line: &str) {
        match self {
            Self::Known(existing) if !existing.is_empty() => {
                existing.push('\n');
                existing.push_str(line);
            }
            _ => *self = Self::text(line),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Detail<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(value) => write!(f, "{}", value),
            Self::Unknown => write!(f, "{}", crate::constants::NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDetails {
    pub package: Package,
    pub publisher: Detail<String>,
    pub author: Detail<String>,
    pub description: Detail<String>,
    pub homepage_url: Detail<String>,
    pub license: Detail<String>,
    pub license_url: Detail<String>,
    pub installer_url: Detail<String>,
    pub installer_hash: Detail<String>,
    /// Megabytes
    pub installer_size: Detail<u64>,
    pub installer_type: Detail<String>,
    pub manifest_url: Detail<String>,
    pub update_date: Detail<String>,
    pub release_notes: Detail<String>,
    pub release_notes_url: Detail<String>,
    pub versions: Vec<String>,
    pub architectures: Vec<String>,
    pub scopes: Vec<String>,
    pub tags: Vec<String>,
}

impl PackageDetails {
    pub fn new(package: Package) -> Self {
        Self {
            package,
            publisher: Detail::Unknown,
            author: Detail::Unknown,
            description: Detail::Unknown,
            homepage_url: Detail::Unknown,
            license: Detail::Unknown,
            license_url: Detail::Unknown,
            installer_url: Detail::Unknown,
            installer_hash: Detail::Unknown,
            installer_size: Detail::Unknown,
            installer_type: Detail::Unknown,
            manifest_url: Detail::Unknown,
            update_date: Detail::Unknown,
            release_notes: Detail::Unknown,
            release_notes_url: Detail::Unknown,
            versions: Vec::new(),
            architectures: Vec::new(),
            scopes: Vec::new(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Install,
    Update,
    Uninstall,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Update => write!(f, "update"),
            Self::Uninstall => write!(f, "uninstall"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Machine,
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" | "current user" | "local" => Ok(Self::User),
            "machine" | "local machine" | "global" => Ok(Self::Machine),
            other => Err(format!("unknown scope '{}'", other)),
        }
    }
}

/// Tag displayed next to a package in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTag {
    Default,
    Pending,
    Processing,
    Failed,
    Installed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_name() {
        let a = Package::new("Foo", "foo", "1.0", "Winget: winget", Backend::Winget);
        let b = Package::new("Foo Trunc…", "foo", "1.0", "Winget: winget", Backend::Winget);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn ui_handle_is_carried_but_not_identity() {
        let plain = Package::new("Foo", "foo", "1.0", "Winget: winget", Backend::Winget);
        let tagged = plain.clone().with_ui_handle(UiHandle(7));
        assert_eq!(tagged.ui_handle, Some(UiHandle(7)));
        assert_eq!(tagged.key(), plain.key());
    }

    #[test]
    fn upgradable_target_carries_new_version() {
        let pkg = Package::new("Foo", "foo", "1.0", "Scoop: main", Backend::Scoop);
        let up = UpgradablePackage::new(pkg, "2.0");
        assert_eq!(up.target.version, "2.0");
        assert_eq!(up.package.version, "1.0");
        assert_eq!(up.key(), up.target.key());
    }

    #[test]
    fn detail_defaults_to_sentinel() {
        let details = PackageDetails::new(Package::new("a", "a", "1", "Pip", Backend::Pip));
        assert_eq!(details.publisher.to_string(), "Not available");
        assert!(!details.installer_size.is_known());
    }

    #[test]
    fn detail_text_trims_and_rejects_blank() {
        assert_eq!(Detail::text("  "), Detail::Unknown);
        assert_eq!(Detail::text(" MIT "), Detail::Known("MIT".to_string()));
    }

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("choco".parse::<Backend>(), Ok(Backend::Chocolatey));
        assert_eq!("MSStore".parse::<Backend>(), Ok(Backend::MsStore));
        assert!("apt".parse::<Backend>().is_err());
    }
}
