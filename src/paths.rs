// src/paths.rs
//! Centralized path derivation for the state database

use std::path::{Path, PathBuf};

/// Environment variable overriding the database location
pub const DB_ENV: &str = "SEARCHSYNC_DB";

/// Database file name inside the data directory
const DB_FILE: &str = "state.db";

/// Get the default data directory
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("searchsync")
}

/// Get the default database path, honoring `SEARCHSYNC_DB`
pub fn default_db_path() -> PathBuf {
    std::env::var(DB_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join(DB_FILE))
}

/// Resolve the database path from an optional command-line value
pub fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    explicit
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_db_path)
}

/// Get the directory containing the database
pub fn db_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(
            resolve_db_path(Some("/tmp/custom/state.db")),
            PathBuf::from("/tmp/custom/state.db")
        );
    }

    #[test]
    fn test_default_path_file_name() {
        let path = resolve_db_path(None);
        assert!(path.to_string_lossy().ends_with(".db"));
    }

    #[test]
    fn test_db_dir() {
        assert_eq!(
            db_dir(Path::new("/var/lib/searchsync/state.db")),
            PathBuf::from("/var/lib/searchsync")
        );
    }
}
