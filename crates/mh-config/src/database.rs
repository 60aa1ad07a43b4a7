//! Local libSQL database location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Path understood by libSQL as a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

fn default_path() -> String {
    ".mhouse/mhouse.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    /// Directory that must exist before the database file can be created.
    #[must_use]
    pub fn parent_dir(&self) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }
        PathBuf::from(&self.path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_into_project_dir() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, ".mhouse/mhouse.db");
        assert!(!config.is_in_memory());
        assert_eq!(config.parent_dir(), Some(PathBuf::from(".mhouse")));
    }

    #[test]
    fn in_memory_has_no_parent() {
        let config = DatabaseConfig {
            path: IN_MEMORY.into(),
        };
        assert!(config.is_in_memory());
        assert_eq!(config.parent_dir(), None);
    }

    #[test]
    fn bare_file_name_has_no_parent() {
        let config = DatabaseConfig {
            path: "mhouse.db".into(),
        };
        assert_eq!(config.parent_dir(), None);
    }
}
