use super::schema::Settings;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./wayfind.yaml
    /// 2. ~/.wayfind/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<Settings, ConfigError> {
        let local_config = PathBuf::from("./wayfind.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".wayfind").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(Settings::default())
    }

    pub async fn load_from(path: &Path) -> Result<Settings, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = serde_yaml::from_str(content)?;
        validate(&settings)?;
        Ok(settings)
    }
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let timeouts = &settings.timeouts;
    if timeouts.poll_ms == 0 {
        return Err(ConfigError::Invalid(
            "timeouts.poll_ms must be greater than zero".into(),
        ));
    }
    if timeouts.poll_ms > timeouts.resolve_ms {
        return Err(ConfigError::Invalid(format!(
            "timeouts.poll_ms ({}) exceeds timeouts.resolve_ms ({})",
            timeouts.poll_ms, timeouts.resolve_ms
        )));
    }
    if settings.webdriver.url.trim().is_empty() {
        return Err(ConfigError::Invalid("webdriver.url is empty".into()));
    }
    Ok(())
}
