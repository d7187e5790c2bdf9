use crate::agent::orchestrator::{DEFAULT_MAX_HISTORY, DEFAULT_MAX_ITERATIONS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const COOKIN_DIR: &str = ".cookin";

pub const DEFAULT_MODEL: &str = "gemini-flash-lite-latest";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_iterations: usize,
    pub max_history: usize,
    pub temperature: f64,
    pub tagged_tool_calls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_history: DEFAULT_MAX_HISTORY,
            temperature: 1.0,
            tagged_tool_calls: false,
        }
    }
}

pub fn get_cookin_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(COOKIN_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_cookin_dir().join("config.toml")
}

pub fn ensure_cookin_dir() -> Result<PathBuf> {
    let cookin_dir = get_cookin_dir();

    if !cookin_dir.exists() {
        std::fs::create_dir_all(&cookin_dir).with_context(|| {
            format!(
                "Failed to create cookin directory at {}",
                cookin_dir.display()
            )
        })?;
    }

    Ok(cookin_dir)
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().unwrap_or("gemini")
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'cookin onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_cookin_dir()?;
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.provider_name(), "gemini");
        assert_eq!(config.model, "gemini-flash-lite-latest");
        assert_eq!(config.max_iterations, 10);
        assert!(!config.tagged_tool_calls);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "provider = \"openai\"\nmodel = \"gpt-4o-mini\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.provider_name(), "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_history, DEFAULT_MAX_HISTORY);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let config = Config {
            api_key: "secret".into(),
            max_iterations: 4,
            tagged_tool_calls: true,
            ..Config::default()
        };

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.api_key, "secret");
        assert_eq!(loaded.max_iterations, 4);
        assert!(loaded.tagged_tool_calls);
    }

    #[test]
    fn missing_file_points_to_onboarding() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_from(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("cookin onboard"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "max_iterations = \"many\"").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
