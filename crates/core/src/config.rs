//! Application configuration
//!
//! Read from `config.toml` in the platform config directory, or from the file
//! named by `NATTER_CONFIG`. Every field has a default, so a missing file or
//! a partial one is fine.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::MIN_PASSWORD_LEN;
use crate::error::{Error, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "NATTER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the database lives; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    pub identity_code: IdentityCodeConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "natter.db".to_string(),
            identity_code: IdentityCodeConfig::default(),
            auth: AuthConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Pixel size of the rendered identity code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityCodeConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for IdentityCodeConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: MIN_PASSWORD_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `NATTER_CONFIG` or the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "onyx", "natter")
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = Self::project_dirs().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.database_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.identity_code.width, 400);
        assert_eq!(config.auth.min_password_len, MIN_PASSWORD_LEN);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml_str(
            r#"
            data_dir = "/tmp/natter"

            [identity_code]
            width = 256

            [log]
            filter = "natter=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.identity_code.width, 256);
        assert_eq!(config.identity_code.height, 400);
        assert_eq!(config.log.filter, "natter=debug");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/natter/natter.db")
        );
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = AppConfig::from_toml_str("identity_code = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_file = \"other.db\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_file, "other.db");
    }
}
