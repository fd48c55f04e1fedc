//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::files::attributes::SymlinkResolver;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Resolves symlinks on the real filesystem.
///
/// Only the path itself is checked; a regular file below a symlinked
/// directory is not a symlink.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSymlinkResolver;

impl SymlinkResolver for FsSymlinkResolver {
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let metadata = fs::symlink_metadata(path).ok()?;
        if !metadata.file_type().is_symlink() {
            return None;
        }

        match fs::canonicalize(path) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                tracing::debug!("dangling symlink {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("out/nested/model.json");
        write_string(&file, "{}").unwrap();
        assert_eq!(read_to_string(&file).unwrap(), "{}");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/ws"), Path::new("/ob/external")),
            PathBuf::from("../ob/external")
        );
        assert_eq!(
            relative_path(Path::new("/ws"), Path::new("/ws/App")),
            PathBuf::from("App")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_symlink_resolver() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        fs::create_dir_all(real.join("Sources")).unwrap();
        fs::write(real.join("Sources/a.swift"), "").unwrap();
        let link = tmp.path().join("link");
        symlink(&real, &link).unwrap();

        let resolver = FsSymlinkResolver;
        assert_eq!(
            resolver.resolve(&link),
            Some(fs::canonicalize(&real).unwrap())
        );
        assert_eq!(resolver.resolve(&real), None);
        assert_eq!(resolver.resolve(&link.join("Sources/a.swift")), None);
        assert_eq!(resolver.resolve(&tmp.path().join("missing")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink() {
        let tmp = TempDir::new().unwrap();
        let link = tmp.path().join("dangling");
        symlink(&tmp.path().join("nowhere"), &link).unwrap();
        assert_eq!(FsSymlinkResolver.resolve(&link), None);
    }
}
