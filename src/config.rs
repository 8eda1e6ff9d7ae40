use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "BUDGETPLANNER_DATA_DIR";
pub(crate) const LOG_FILTER_ENV: &str = "BUDGETPLANNER_LOG";
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";

/// Where the planner keeps its files.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory from the environment, falling back to the
    /// platform data dir, and make sure it exists.
    pub(crate) fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => directories::ProjectDirs::from("com", "budgetplanner", "BudgetPlanner")
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
                .data_dir()
                .to_path_buf(),
        };
        Self::with_data_dir(data_dir)
    }

    pub(crate) fn with_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self { data_dir })
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join("budgetplanner.db")
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("budgetplanner.log")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_with_data_dir_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("data");
        let config = Config::with_data_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(config.db_path(), dir.join("budgetplanner.db"));
        assert_eq!(config.log_path(), dir.join("budgetplanner.log"));
    }
}
