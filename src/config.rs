// src/config.rs - Configuration: defaults -> optional TOML file -> env overrides
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the backend REST API, e.g. "http://127.0.0.1:8000/api".
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the persisted access/refresh token pair.
    pub token_file: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Seconds between low-stock polls of the summary report.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: "cabstock-session.json".to_string(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            notifications: NotificationsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_env_file()?;

    let mut config = if let Ok(config_file) = env::var("CONFIG_FILE") {
        let config_str = fs::read_to_string(&config_file)
            .with_context(|| format!("Failed to read config file: {}", config_file))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_file))?
    } else {
        Config::default()
    };

    override_with_env(&mut config);

    config.validate().context("Configuration validation failed")?;

    Ok(config)
}

fn override_with_env(config: &mut Config) {
    if let Ok(url) = env::var("CABSTOCK_API_URL") {
        config.api.base_url = url;
    }
    if let Ok(token_file) = env::var("CABSTOCK_TOKEN_FILE") {
        config.session.token_file = token_file;
    }
    if let Ok(secs_str) = env::var("CABSTOCK_POLL_SECS") {
        if let Ok(secs) = secs_str.parse::<u64>() {
            config.notifications.poll_interval_secs = secs;
        }
    }
    if let Ok(level) = env::var("RUST_LOG") {
        config.logging.level = level;
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("api.base_url must not be empty"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "api.base_url must be an http(s) URL (current: {})",
                self.api.base_url
            ));
        }
        if self.notifications.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("notifications.poll_interval_secs must be positive"));
        }
        if self.session.token_file.trim().is_empty() {
            return Err(anyhow::anyhow!("session.token_file must not be empty"));
        }
        Ok(())
    }

    pub fn print_startup_info(&self) {
        log::info!("cabstock starting up...");
        log::info!("API root: {}", self.api.base_url);
        log::info!("Session file: {}", self.session.token_file);
        log::info!(
            "Low-stock poll: every {}s",
            self.notifications.poll_interval_secs
        );
        log::info!("Logging: {} level", self.logging.level);
    }
}

pub fn load_env_file() -> Result<()> {
    if let Ok(env_file) = env::var("ENV_FILE") {
        dotenvy::from_filename(&env_file)
            .with_context(|| format!("Failed to load environment file: {}", env_file))?;
    } else if Path::new(".env").exists() {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.notifications.poll_interval_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.api.base_url = "".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://stock.example.com/api".to_string();
        assert!(config.validate().is_ok());

        config.notifications.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_content = r#"
        [api]
        base_url = "https://inventory.lab.local/api"

        [notifications]
        poll_interval_secs = 60
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://inventory.lab.local/api");
        assert_eq!(config.notifications.poll_interval_secs, 60);
        // Sections absent from the file keep their defaults
        assert_eq!(config.session.token_file, "cabstock-session.json");
    }

    #[test]
    fn test_env_override() {
        env::set_var("CABSTOCK_POLL_SECS", "120");
        let mut config = Config::default();
        override_with_env(&mut config);
        assert_eq!(config.notifications.poll_interval_secs, 120);
        env::remove_var("CABSTOCK_POLL_SECS");
    }
}
