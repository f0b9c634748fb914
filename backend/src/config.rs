//! # Server Configuration
//!
//! Settings are read once at startup from a TOML file and a handful of
//! environment variables, then shared read-only through the application state.
//!
//! Lookup order:
//! 1. `$CAMPUS_CONFIG` if set, otherwise `campus.toml` in the working directory.
//!    A missing file is not an error; every section has defaults.
//! 2. `CAMPUS_HOST`, `CAMPUS_PORT` and `CAMPUS_DATABASE` override the file.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "campus.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {}", .0.display(), .1)]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("invalid value for {0}: {1:?}")]
    InvalidEnv(&'static str, String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted JSON body.
    pub json_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            json_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Root for uploaded branding assets, served under `/uploads`.
    pub uploads_dir: PathBuf,
    /// When set, every rendered PDF is also written here as `cert-<id>.pdf`.
    pub pdf_cache_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("campus.sqlite"),
            uploads_dir: PathBuf::from("uploads"),
            pdf_cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Directory holding `<Family>-Regular.ttf`, `-Bold`, `-Italic`, `-BoldItalic`.
    pub dir: PathBuf,
    /// Optional TTF URLs keyed by role (`number`, `brand`, `caption`, `date`).
    pub decorative: BTreeMap<String, String>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./fonts"),
            decorative: BTreeMap::new(),
        }
    }
}

/// One row of the title keyword table used to derive academic hours.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HoursRule {
    pub keyword: String,
    pub hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CertificatesConfig {
    pub default_hours: u32,
    /// Checked in order; the first keyword contained in the title wins.
    pub hours: Vec<HoursRule>,
    /// Manager name snapshotted when the template has none.
    pub default_manager: String,
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self {
            default_hours: 20,
            hours: vec![
                HoursRule {
                    keyword: "actualización".to_string(),
                    hours: 5,
                },
                HoursRule {
                    keyword: "oficial de protección radiológica".to_string(),
                    hours: 50,
                },
            ],
            default_manager: "Director Académico".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub fonts: FontsConfig,
    pub certificates: CertificatesConfig,
}

impl AppConfig {
    /// Loads the configuration file (if any) and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("CAMPUS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::from_file(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CAMPUS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CAMPUS_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("CAMPUS_PORT", port.clone()))?;
        }
        if let Some(database) = lookup("CAMPUS_DATABASE") {
            self.storage.database = PathBuf::from(database);
        }
        Ok(())
    }
}
