//! Filesystem helpers for locating the knowledge database.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Gets the cross-platform database path.
///
/// Returns the path as `{data_dir}/secondbrain/knowledge.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("secondbrain").join("knowledge.db"))
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn get_database_path_returns_valid_path() {
        let path = get_database_path().unwrap();
        assert!(path.to_string_lossy().contains("secondbrain"));
        assert!(path.to_string_lossy().ends_with("knowledge.db"));
    }

    #[test]
    fn ensure_database_directory_creates_nested_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("a").join("b").join("knowledge.db");

        ensure_database_directory(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }

    #[test]
    fn ensure_database_directory_accepts_bare_file_name() {
        assert!(ensure_database_directory(Path::new("knowledge.db")).is_ok());
    }
}
