//! Path utilities for determining data storage locations.
//!
//! The `SQLite` database lives under the platform data directory, e.g.
//! `~/.local/share/task-board/` on Linux.

use std::path::PathBuf;

/// The directory name under the platform data directory.
const DATA_DIR_NAME: &str = "task-board";

/// The database filename.
pub const DATABASE_FILENAME: &str = "tasks.sqlite3";

/// Get the base data directory for task-board.
///
/// Returns `None` if the platform data directory cannot be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join(DATA_DIR_NAME))
}

/// Get the default database path.
#[must_use]
pub fn default_database_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DATABASE_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_is_under_platform_data_dir() {
        if let Some(base) = dirs::data_dir() {
            assert_eq!(data_dir().unwrap(), base.join("task-board"));
        }
    }

    #[test]
    fn test_default_database_path_ends_with_filename() {
        if let Some(path) = default_database_path() {
            assert!(path.ends_with(DATABASE_FILENAME));
            assert_eq!(path.parent(), data_dir().as_deref());
        }
    }
}
