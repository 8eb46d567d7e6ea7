use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default)]
    pub unattended: bool,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub image: ImageConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    #[serde(default = "default_image_base_url")]
    pub base_url: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_styles")]
    pub styles: Vec<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_image_timeout")]
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: default_output(),
            unattended: false,
            llm: LlmConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_model(),
            fallback_models: default_fallback_models(),
            timeout_seconds: default_llm_timeout(),
            fallback_delay_ms: default_fallback_delay(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_base_url(),
            style: default_style(),
            styles: default_styles(),
            width: default_width(),
            height: default_height(),
            timeout_seconds: default_image_timeout(),
        }
    }
}

fn default_output() -> String {
    "output".to_string()
}
fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_fallback_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".to_string(),
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
    ]
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_fallback_delay() -> u64 {
    1000
}
fn default_image_base_url() -> String {
    "https://image.pollinations.ai".to_string()
}
fn default_style() -> String {
    "flux".to_string()
}
fn default_styles() -> Vec<String> {
    vec!["flux".to_string(), "turbo".to_string()]
}
fn default_width() -> u32 {
    1024
}
fn default_height() -> u32 {
    576
}
fn default_image_timeout() -> u64 {
    20
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

impl ImageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config.yml")?;
            Self::from_yaml(&content)?
        } else {
            log::warn!("config.yml not found, using defaults");
            Config::default()
        };

        if config.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                config.llm.api_key = key;
            }
        }
        if config.llm.api_key.trim().is_empty() {
            anyhow::bail!(
                "No API key: set llm.api_key in config.yml or the {} environment variable.",
                API_KEY_ENV
            );
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml_ng::from_str(content).context("Failed to parse config.yml")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.output_folder, "output");
        assert_eq!(config.llm.timeout_seconds, 30);
        assert_eq!(config.llm.fallback_delay_ms, 1000);
        assert_eq!(config.image.width, 1024);
        assert_eq!(config.image.height, 576);
        assert_eq!(config.image.timeout_seconds, 20);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
llm:
  api_key: "abc"
  model: "gemini-1.5-pro"
image:
  style: "turbo"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.llm.api_key, "abc");
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.fallback_models.len(), 3);
        assert_eq!(config.image.style, "turbo");
        assert_eq!(config.image.base_url, "https://image.pollinations.ai");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(Config::from_yaml("llm: [1, 2").is_err());
    }
}
