use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, anyhow};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub service_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub history_path: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            service_url: Some(DEFAULT_SERVICE_URL.to_string()),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            history_path: None,
            log_filter: None,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Service URL - env var first, then config, then the local default
    pub fn service_url(&self) -> String {
        std::env::var("LASTFIVE_SERVICE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.service_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = std::env::var("LASTFIVE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .or(self.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.history_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::get_data_dir()?.join("history.db")),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(Self::get_data_dir()?.join("logs"))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("lastfive").join("config.json"))
    }

    fn get_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join("lastfive"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_parses() {
        let config: Config = serde_json::from_str(r#"{"service_url": "http://10.0.0.2:9000/"}"#).unwrap();
        assert_eq!(config.service_url.as_deref(), Some("http://10.0.0.2:9000/"));
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.history_path, None);
    }

    #[test]
    fn test_explicit_history_path_wins() {
        let mut config = Config::new();
        config.history_path = Some(PathBuf::from("/tmp/lastfive-test.db"));
        assert_eq!(config.history_path().unwrap(), PathBuf::from("/tmp/lastfive-test.db"));
    }
}
