//! Application configuration
//!
//! An optional `config.toml` in the platform config directory can override
//! the database location; otherwise the database lives in the platform data
//! directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use punchdesk_core::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Override for the database file location
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load `config.toml` if present, defaults otherwise
    pub fn load() -> Result<Self> {
        let dirs = project_dirs()?;
        let path = dirs.config_dir().join("config.toml");

        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)?;
        let config = toml::from_str(&text)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Resolve the database path, creating its parent directory
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => project_dirs()?.data_dir().join("punchdesk.db"),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(path)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "punchdesk", "punchdesk").ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_database_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let wanted = dir.path().join("nested").join("kiosk.db");

        let config = Config {
            database_path: Some(wanted.clone()),
        };

        let resolved = config.database_path().unwrap();
        assert_eq!(resolved, wanted);
        // Parent directory was created
        assert!(wanted.parent().unwrap().is_dir());
    }

    #[test]
    fn test_config_parses_database_path() {
        let config: Config = toml::from_str(r#"database_path = "/tmp/kiosk.db""#).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/kiosk.db")));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.database_path.is_none());
    }
}
