use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::SummaryFormat;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_METADATA_ENDPOINT: &str = "https://noembed.com/embed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    pub gemini_api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,

    #[serde(default = "default_export_dir")]
    pub export_dir: String,

    #[serde(default)]
    pub default_format: SummaryFormat,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yt-summarizer");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("storage.db").to_string_lossy().to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_metadata_endpoint() -> String {
    DEFAULT_METADATA_ENDPOINT.to_string()
}

fn default_export_dir() -> String {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            gemini_api_key: None,
            model: default_model(),
            metadata_endpoint: default_metadata_endpoint(),
            export_dir: default_export_dir(),
            default_format: SummaryFormat::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        Ok(config.with_env_fallback(std::env::var("GEMINI_API_KEY").ok()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yt-summarizer")
            .join("config.toml")
    }

    /// The config file wins; the environment only fills a missing key.
    fn with_env_fallback(mut self, env_key: Option<String>) -> Self {
        let configured = self
            .gemini_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !configured {
            self.gemini_api_key = env_key.filter(|key| !key.trim().is_empty());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::parse("gemini_api_key = \"abc\"\n").unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.metadata_endpoint, DEFAULT_METADATA_ENDPOINT);
        assert_eq!(config.default_format, SummaryFormat::KeyTopics);
    }

    #[test]
    fn default_format_reads_label() {
        let config = Config::parse("default_format = \"Detailed Paragraph\"\n").unwrap();
        assert_eq!(config.default_format, SummaryFormat::DetailedParagraph);
    }

    #[test]
    fn env_key_only_fills_gaps() {
        let from_env = Config::parse("").unwrap().with_env_fallback(Some("env".into()));
        assert_eq!(from_env.gemini_api_key.as_deref(), Some("env"));

        let from_file = Config::parse("gemini_api_key = \"file\"\n")
            .unwrap()
            .with_env_fallback(Some("env".into()));
        assert_eq!(from_file.gemini_api_key.as_deref(), Some("file"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::parse("model = ").is_err());
    }
}
