//! Path utilities for devkit

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::CONFIG_FILE_NAME;
use crate::error::{hints, DevkitError};

/// Find Devkit.toml by searching up from the current directory
pub fn find_config_file() -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    find_config_file_from(&current_dir)
}

/// Find Devkit.toml starting from a specific directory
pub fn find_config_file_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => {
                return Err(DevkitError::config_error_with_hint(
                    format!(
                        "Could not find {} in {} or any parent",
                        CONFIG_FILE_NAME,
                        start.display()
                    ),
                    None,
                    hints::config_not_found(),
                )
                .into())
            }
        }
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into its parent.
///
/// The filesystem is never touched, so this works for paths that do not exist
/// (a typo'd project root must still compare equal to itself).
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Resolve `path` against `base` unless it is already absolute, then normalize
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_drops_cur_dir_and_folds_parent() {
        assert_eq!(
            normalize_path(Path::new("/p/./etl/../etl/tests")),
            PathBuf::from("/p/etl/tests")
        );
        assert_eq!(normalize_path(Path::new("a/b/..")), PathBuf::from("a"));
    }

    #[test]
    fn test_resolve_against_keeps_absolute_paths() {
        let base = Path::new("/work");
        assert_eq!(
            resolve_against(base, Path::new("/abs/dir")),
            PathBuf::from("/abs/dir")
        );
        assert_eq!(
            resolve_against(base, Path::new("etl/tests")),
            PathBuf::from("/work/etl/tests")
        );
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("etl").join("include");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();

        let found = find_config_file_from(&nested).unwrap();
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_find_config_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = find_config_file_from(temp.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
