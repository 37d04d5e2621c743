//! Recent-user list persisted as a JSON array file.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use studioinv_inventory::UserHistory;

use crate::config::UserHistoryConfig;

#[derive(Debug, Error)]
pub enum UserHistoryError {
    #[error("user history io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode user history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed [`UserHistory`].
///
/// A missing or unreadable file loads as an empty list; the list is a
/// convenience, never a reason to fail.
#[derive(Debug, Clone)]
pub struct UserHistoryFile {
    path: PathBuf,
    capacity: usize,
}

impl UserHistoryFile {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn from_config(config: &UserHistoryConfig) -> Self {
        Self::new(config.path.clone(), config.capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> UserHistory {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return UserHistory::new(self.capacity),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read user history");
                return UserHistory::new(self.capacity);
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(names) => UserHistory::from_names(names, self.capacity),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding malformed user history");
                UserHistory::new(self.capacity)
            }
        }
    }

    pub fn save(&self, history: &UserHistory) -> Result<(), UserHistoryError> {
        let json = serde_json::to_string(history.names())?;
        std::fs::write(&self.path, json).map_err(|source| UserHistoryError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Load, record `name`, and save if it was new.
    pub fn record(&self, name: &str) -> Result<UserHistory, UserHistoryError> {
        let mut history = self.load();
        if history.record(name) {
            self.save(&history)?;
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("studioinv-users-{}.json", uuid::Uuid::now_v7()))
    }

    #[test]
    fn missing_file_is_empty() {
        let file = UserHistoryFile::new(temp_file(), 10);
        assert!(file.load().names().is_empty());
    }

    #[test]
    fn capacity_comes_from_config() {
        let config = UserHistoryConfig {
            path: temp_file(),
            capacity: 2,
        };
        let file = UserHistoryFile::from_config(&config);
        assert_eq!(file.load().capacity(), 2);
        assert_eq!(file.path(), config.path.as_path());
    }

    #[test]
    fn record_persists_most_recent_first() {
        let path = temp_file();
        let file = UserHistoryFile::new(&path, 10);

        file.record("Alice").unwrap();
        file.record("Bob").unwrap();
        let history = file.record("Alice").unwrap();

        assert_eq!(history.names(), ["Bob", "Alice"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["Bob","Alice"]"#);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_loads_empty() {
        let path = temp_file();
        std::fs::write(&path, "{not json").unwrap();

        let file = UserHistoryFile::new(&path, 10);
        assert!(file.load().names().is_empty());
        let _ = std::fs::remove_file(path);
    }
}
