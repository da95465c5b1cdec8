//! # Configuration Module
//!
//! Explicit path configuration for the store, the export input directory
//! and the report output directory. A `Config` is built once and passed to
//! the importer and the analytics layer at construction; there is no
//! module-level "current store" state.
//!
//! ## Data Storage
//!
//! By default everything lives under the platform-standard data directory:
//! - Linux: `~/.local/share/replay/`
//! - macOS: `~/Library/Application Support/replay/`
//! - Windows: `%APPDATA%\replay\`
//!
//! with `db/` holding the published store, `data/` scanned for exports and
//! `outputs/` receiving report artifacts.

use crate::error::{Error, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// File name of the published store inside `data_dir`.
pub const STORE_FILE: &str = "listens.db";

/// Where replay reads and writes. Constructed once, passed explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the published store file.
    pub data_dir: PathBuf,
    /// Directory scanned for `StreamingHistory*.json` export files.
    pub input_dir: PathBuf,
    /// Directory report artifacts (CSVs, markdown) are written to.
    pub output_dir: PathBuf,
    /// Optional `artistName,genres` side-table enabling the genre rollup.
    pub genres_path: Option<PathBuf>,
}

impl Config {
    /// Configuration rooted at the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the system data directory cannot be determined.
    pub fn new() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| {
                Error::Config("could not determine the system data directory".to_string())
            })?
            .join("replay");

        Ok(Self {
            data_dir: base.join("db"),
            input_dir: base.join("data"),
            output_dir: base.join("outputs"),
            genres_path: None,
        })
    }

    /// Path of the published store file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Replace the store directory with a user-supplied one.
    pub fn with_data_dir(mut self, dir: &Path) -> Result<Self> {
        self.data_dir = absolutize(dir)?;
        Ok(self)
    }

    /// Replace the export input directory with a user-supplied one.
    pub fn with_input_dir(mut self, dir: &Path) -> Result<Self> {
        self.input_dir = absolutize(dir)?;
        Ok(self)
    }

    /// Replace the report output directory with a user-supplied one.
    pub fn with_output_dir(mut self, dir: &Path) -> Result<Self> {
        self.output_dir = absolutize(dir)?;
        Ok(self)
    }

    /// Point at a genre side-table file.
    pub fn with_genres_path(mut self, path: &Path) -> Result<Self> {
        self.genres_path = Some(absolutize(path)?);
        Ok(self)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(path.absolutize()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_layout() {
        let config = Config::new().expect("platform data dir should resolve");

        assert!(config.db_path().ends_with("replay/db/listens.db"));
        assert!(config.input_dir.ends_with("replay/data"));
        assert!(config.output_dir.ends_with("replay/outputs"));
        assert!(config.genres_path.is_none());
    }

    #[test]
    fn test_db_path_is_inside_data_dir() {
        let config = Config::new().unwrap();
        assert_eq!(config.db_path().parent(), Some(config.data_dir.as_path()));
        assert_eq!(config.db_path().file_name().unwrap(), STORE_FILE);
    }

    #[test]
    fn test_with_data_dir_absolutizes_relative_paths() {
        let config = Config::new()
            .unwrap()
            .with_data_dir(Path::new("some/relative/db"))
            .unwrap();
        assert!(config.data_dir.is_absolute());
        assert!(config.data_dir.ends_with("some/relative/db"));
    }

    #[test]
    fn test_with_genres_path() {
        let config = Config::new()
            .unwrap()
            .with_genres_path(Path::new("/tmp/artist_genres.csv"))
            .unwrap();
        assert_eq!(
            config.genres_path,
            Some(PathBuf::from("/tmp/artist_genres.csv"))
        );
    }
}
