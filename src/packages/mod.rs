//! # Package manager implementations
//!
//! One type per supported backend, each implementing [`PackageManager`]:
//!
//! - **Winget** (`winget.rs`): fixed-width tables located by column titles
//! - **Microsoft Store** (`msstore.rs`): winget pinned to the `msstore` source
//! - **Scoop** (`scoop.rs`): bucket-qualified ids, JSON manifests, global installs
//! - **Chocolatey** (`choco.rs`): pipe-delimited outdated list, cached catalog
//! - **.NET tools** (`dotnet.rs`): `dotnet tool` tables plus `dotnet-tools-outdated`
//! - **Npm** (`npm.rs`): local and global trees
//! - **Pip** (`pip.rs`): `pip list` tables and `parse_pip_search`
//!
//! Callers go through the [`BackendRegistry`] instead of naming types.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use unipkg::core::types::Backend;
//! use unipkg::packages::create_manager;
//! use unipkg::packages::traits::SystemRunner;
//!
//! let manager = create_manager(Backend::Scoop)?;
//! let runner = SystemRunner { timeout: Duration::from_secs(120) };
//! for pkg in manager.list_installed(&runner)? {
//!     println!("{} {}", pkg.id, pkg.version);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod choco;
pub mod dotnet;
pub mod listing;
pub mod msstore;
pub mod npm;
pub mod pip;
pub mod registry;
pub mod scoop;
pub mod traits;
pub mod winget;

pub use listing::Catalog;
pub use registry::{BackendRegistry, create_manager, get_registry};
pub use traits::{CommandRunner, PackageManager, SystemRunner};

#[cfg(test)]
mod tests;
