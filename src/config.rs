//! Configuration
//!
//! Defaults, overlaid by `<home>/config.json` when present, overlaid by
//! environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8088";
pub const DEFAULT_HOME_DIR: &str = ".kalyani-admin";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_HOME: &str = "KALYANI_ADMIN_HOME";
pub const ENV_API_BASE_URL: &str = "KALYANI_API_BASE_URL";
pub const ENV_SESSION_FILE: &str = "KALYANI_SESSION_FILE";
pub const ENV_LOG_DIR: &str = "KALYANI_LOG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("api base url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub log_dir: PathBuf,
}

/// On-disk overrides; every field optional
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    api_base_url: Option<String>,
    session_file: Option<PathBuf>,
    log_dir: Option<PathBuf>,
}

impl AdminConfig {
    /// Defaults rooted at `home`
    pub fn with_home(home: &Path) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: home.join("session.json"),
            log_dir: home.join("logs"),
        }
    }

    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let home = non_blank(env(ENV_HOME))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HOME_DIR));
        Self::resolve(&home, env)
    }

    /// Resolve against `home` with an injectable environment lookup
    pub fn resolve<F>(home: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_home(home);

        let file = read_config_file(&home.join(CONFIG_FILE_NAME))?;
        if let Some(url) = non_blank(file.api_base_url) {
            config.api_base_url = url;
        }
        if let Some(path) = file.session_file {
            config.session_file = path;
        }
        if let Some(path) = file.log_dir {
            config.log_dir = path;
        }

        if let Some(url) = non_blank(env(ENV_API_BASE_URL)) {
            config.api_base_url = url;
        }
        if let Some(path) = non_blank(env(ENV_SESSION_FILE)) {
            config.session_file = PathBuf::from(path);
        }
        if let Some(path) = non_blank(env(ENV_LOG_DIR)) {
            config.log_dir = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidBaseUrl(self.api_base_url.clone()))
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
