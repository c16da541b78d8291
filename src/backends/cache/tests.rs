use super::*;
use proptest::prelude::*;

fn entry(id: &str, version: &str) -> CacheEntry {
    CacheEntry::new(id, id, version, None)
}

#[test]
fn test_parse_drops_short_rows() {
    let entries = parse_cache("Git,git,2.42.0\nbroken,row\n7-Zip,7zip,23.01,Chocolatey\n\n");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].source.as_deref(), Some("Chocolatey"));
}

#[test]
fn test_render_then_parse_is_stable() {
    let entries = vec![
        CacheEntry::new("Git", "git", "2.42.0", None),
        CacheEntry::new("7-Zip", "7zip", "23.01", Some("Chocolatey")),
    ];
    assert_eq!(parse_cache(&render_cache(&entries)), entries);
}

#[test]
fn test_comma_in_name_is_a_known_limitation() {
    let entries = vec![CacheEntry::new("Foo, Inc. Tool", "foo", "1.0", None)];
    let parsed = parse_cache(&render_cache(&entries));
    assert_ne!(parsed, entries);
}

#[test]
fn test_merge_replaces_same_key_and_keeps_old_only() {
    let old = vec![entry("git", "2.40"), entry("vlc", "3.0")];
    let fresh = vec![entry("git", "2.42"), entry("node", "20")];
    let merged = merge(&fresh, &old);
    assert_eq!(merged, vec![entry("git", "2.42"), entry("node", "20"), entry("vlc", "3.0")]);
}

#[test]
fn test_store_merged_preserves_unlisted_packages() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFile::at(dir.path().join("ChocolateyCachedPackages"));
    cache.store_merged(&[entry("git", "2.40"), entry("vlc", "3.0")]).unwrap();
    cache.store_merged(&[entry("git", "2.42")]).unwrap();

    let on_disk = cache.read().unwrap();
    assert_eq!(on_disk, vec![entry("git", "2.42"), entry("vlc", "3.0")]);
}

#[test]
fn test_cold_cache_scans_synchronously() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFile::at(dir.path().join("WingetCachedPackages"));
    let entries = cache.load_or_scan(|| Ok(vec![entry("git", "1")])).unwrap();
    assert_eq!(entries, vec![entry("git", "1")]);
    assert_eq!(cache.read().unwrap(), entries);
}

#[test]
fn test_warm_cache_returns_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFile::at(dir.path().join("WingetCachedPackages"));
    cache.store_merged(&[entry("old", "1")]).unwrap();

    let entries = cache.load_or_scan(|| Ok(vec![entry("new", "2")])).unwrap();
    assert_eq!(entries, vec![entry("old", "1")]);
}

#[test]
fn test_cold_scan_failure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFile::at(dir.path().join("ScoopCachedPackages"));
    let result = cache.load_or_scan(|| Err(UnipkgError::ExecutableMissing("choco".into())));
    assert!(result.is_err());
}

fn unique_entries() -> impl Strategy<Value = Vec<CacheEntry>> {
    prop::collection::btree_map("[a-z][a-z0-9.-]{0,12}", ("[A-Za-z][A-Za-z ]{0,10}", "[0-9][0-9.]{0,6}"), 0..12)
        .prop_map(|m| {
            m.into_iter()
                .map(|(id, (name, version))| CacheEntry::new(name.trim(), &id, &version, None))
                .collect()
        })
}

proptest! {
    #[test]
    fn merge_is_idempotent(scan in unique_entries()) {
        prop_assert_eq!(merge(&scan, &scan), scan.clone());
    }

    #[test]
    fn merge_never_forgets_old_keys(old in unique_entries(), fresh in unique_entries()) {
        let merged = merge(&fresh, &old);
        for entry in &old {
            prop_assert!(merged.iter().any(|m| m.key() == entry.key()));
        }
        for entry in &fresh {
            prop_assert!(merged.contains(entry));
        }
    }
}
