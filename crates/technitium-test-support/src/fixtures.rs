//! Filesystem and environment fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// File name used for the persisted configuration inside a temporary home.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Temporary directory standing in for the user's configuration home.
///
/// The directory is removed when the fixture is dropped.
pub struct TempConfigHome {
    dir: TempDir,
}

impl TempConfigHome {
    /// Create an empty configuration home.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("technitium-cli-test-")
            .tempdir()
            .context("failed to create temporary config home")?;
        Ok(Self { dir })
    }

    /// Root of the temporary home.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Location of the configuration file inside a nested project directory.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("technitiumdns-cli").join(CONFIG_FILE_NAME)
    }

    /// Write `contents` to [`Self::config_path`], creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write_config(&self, contents: &str) -> Result<PathBuf> {
        let path = self.config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read the configuration file back as text.
    ///
    /// # Errors
    ///
    /// Returns an error when the file does not exist or cannot be read.
    pub fn read_config(&self) -> Result<String> {
        let path = self.config_path();
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Build an owned environment variable list from borrowed pairs.
#[must_use]
pub fn env_vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_home_round_trips_config_text() -> Result<()> {
        let home = TempConfigHome::new()?;
        let path = home.write_config("[api]\n")?;
        assert!(path.starts_with(home.root()));
        assert_eq!(home.read_config()?, "[api]\n");
        Ok(())
    }

    #[test]
    fn env_vars_owns_pairs() {
        let vars = env_vars(&[("A", "1"), ("B", "2")]);
        assert_eq!(vars, vec![("A".into(), "1".into()), ("B".into(), "2".into())]);
    }
}
