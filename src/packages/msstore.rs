//! Microsoft Store backend: winget restricted to the `msstore` source.

use crate::core::types::Backend;
use crate::packages::winget::WingetManager;

pub fn store_manager() -> WingetManager {
    WingetManager::pinned(Backend::MsStore, "msstore")
}
