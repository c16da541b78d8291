//! Per-backend catalog cache files
//!
//! Backends without a fast "list everything" command keep their catalog in
//! `<data dir>/cache/<Backend>CachedPackages`, one `name,id,version[,source]`
//! row per line. Commas inside fields are not escaped; such rows parse wrong
//! and that is accepted. Rows with fewer than three fields are dropped.
//!
//! Writes replace the whole file atomically while holding an exclusive lock
//! on a sibling `.lock` file, so a reader never sees a half-written cache and
//! two refreshers never interleave their merges.

use crate::core::types::{Backend, Package};
use crate::error::{Result, UnipkgError};
use crate::utils::{fs as ufs, paths, worker};
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheEntry {
    pub name: String,
    pub id: String,
    pub version: String,
    pub source: Option<String>,
}

impl CacheEntry {
    pub fn new(name: &str, id: &str, version: &str, source: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            version: version.to_string(),
            source: source.map(str::to_string),
        }
    }

    pub fn from_package(pkg: &Package) -> Self {
        Self::new(&pkg.name, &pkg.id, &pkg.version, Some(&pkg.source))
    }

    /// Entries are matched on id and source; name and version may change between scans.
    pub fn key(&self) -> (&str, Option<&str>) {
        (&self.id, self.source.as_deref())
    }

    pub fn to_package(&self, backend: Backend, default_source: &str) -> Package {
        Package::new(
            self.name.clone(),
            self.id.clone(),
            self.version.clone(),
            self.source.clone().unwrap_or_else(|| default_source.to_string()),
            backend,
        )
    }
}

pub fn parse_cache(content: &str) -> Vec<CacheEntry> {
    content
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.trim_end_matches('\r').split(',').collect();
            if fields.len() < 3 {
                return None;
            }
            let source = fields.get(3).map(|s| s.trim()).filter(|s| !s.is_empty());
            Some(CacheEntry::new(fields[0].trim(), fields[1].trim(), fields[2].trim(), source))
        })
        .collect()
}

pub fn render_cache(entries: &[CacheEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.name);
        out.push(',');
        out.push_str(&entry.id);
        out.push(',');
        out.push_str(&entry.version);
        if let Some(source) = &entry.source {
            out.push(',');
            out.push_str(source);
        }
        out.push('\n');
    }
    out
}

/// Merge a fresh scan into the previous cache.
///
/// Fresh entries come first and win over old ones with the same key; old
/// entries the scan did not list are kept after them. Duplicate keys keep
/// their first occurrence, so merging a cache into itself changes nothing.
pub fn merge(fresh: &[CacheEntry], old: &[CacheEntry]) -> Vec<CacheEntry> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut merged = Vec::with_capacity(fresh.len() + old.len());

    for entry in fresh.iter().chain(old.iter()) {
        let key = (entry.id.clone(), entry.source.clone());
        if seen.insert(key) {
            merged.push(entry.clone());
        }
    }
    merged
}

#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn for_backend(backend: Backend) -> Result<Self> {
        Ok(Self::at(paths::cache_dir()?.join(format!("{}CachedPackages", backend.key()))))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries on disk; an absent file reads as empty.
    pub fn read(&self) -> Result<Vec<CacheEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path).map_err(|e| UnipkgError::IoError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(parse_cache(&String::from_utf8_lossy(&bytes)))
    }

    /// Merge `fresh` into the file under the cache lock and return the new content.
    pub fn store_merged(&self, fresh: &[CacheEntry]) -> Result<Vec<CacheEntry>> {
        let lock_path = self.path.with_extension("lock");
        if let Some(dir) = lock_path.parent() {
            fs::create_dir_all(dir).map_err(|e| UnipkgError::IoError {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| UnipkgError::IoError {
                path: lock_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| UnipkgError::LockError(format!("{}: {}", lock_path.display(), e)))?;

        let result = self.read().and_then(|old| {
            let merged = merge(fresh, &old);
            ufs::write_atomic(&self.path, render_cache(&merged).as_bytes())?;
            Ok(merged)
        });

        let _ = FileExt::unlock(&lock_file);
        result
    }

    /// Return cached entries, scanning first if the cache is cold.
    ///
    /// - empty or absent cache: run `scan` synchronously, store it, return it
    /// - warm cache: return it now and refresh in a background worker
    pub fn load_or_scan<F>(&self, scan: F) -> Result<Vec<CacheEntry>>
    where
        F: FnOnce() -> Result<Vec<CacheEntry>> + Send + 'static,
    {
        let cached = self.read()?;
        if cached.is_empty() {
            tracing::debug!(path = %self.path.display(), "cold cache, scanning synchronously");
            let fresh = scan()?;
            return self.store_merged(&fresh);
        }

        let cache = self.clone();
        worker::spawn_reported("cache-refresh", move || {
            let fresh = scan()?;
            cache.store_merged(&fresh)?;
            tracing::debug!(path = %cache.path.display(), entries = fresh.len(), "cache refreshed");
            Ok(())
        });
        Ok(cached)
    }
}

#[cfg(test)]
mod tests;
