use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string() }
    }
}

/// Where the history table lives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; `None` means `<platform data dir>/weather.db`.
    pub database: Option<PathBuf>,
}

/// Remote Open-Meteo endpoints and request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub timezone: String,
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [server]
/// bind = "0.0.0.0:8080"
///
/// [services]
/// timezone = "Europe/Paris"
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub services: ServicesConfig,
}

impl Config {
    /// Load config from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Configured database file, falling back to the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("weather.db")),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();

        assert_eq!(cfg.server.bind, DEFAULT_BIND);
        assert_eq!(cfg.services.geocoding_url, DEFAULT_GEOCODING_URL);
        assert_eq!(cfg.services.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(cfg.services.timezone, "Asia/Kolkata");
        assert_eq!(cfg.services.timeout(), Duration::from_secs(10));
        assert!(cfg.storage.database.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:8080"

            [services]
            timezone = "Europe/Paris"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.services.timezone, "Europe/Paris");
        assert_eq!(cfg.services.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(cfg.services.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.storage.database = Some(dir.path().join("history.db"));
        cfg.services.timeout_secs = 3;
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.database_path().expect("db path"), dir.path().join("history.db"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nbind = ").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
