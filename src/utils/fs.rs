use crate::error::{Result, UnipkgError};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `content` as one whole-file swap (write temp, fsync, rename).
///
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        UnipkgError::PathError(format!("Invalid path (no parent directory): {}", path.display()))
    })?;
    fs::create_dir_all(dir).map_err(|e| UnipkgError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unipkg".to_string());
    let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| UnipkgError::IoError {
        path: tmp_path.clone(),
        source: e,
    })?;
    tmp_file.write_all(content)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| UnipkgError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
