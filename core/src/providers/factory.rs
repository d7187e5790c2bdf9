use crate::config::Config;
use crate::error::{BotError, Result};
use crate::providers::{GeminiProvider, OpenAIProvider};
use crate::traits::Provider;

const GEMINI_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "COOKIN_GEMINI_API_KEY"];
const OPENAI_KEY_VARS: &[&str] = &["OPENAI_API_KEY", "COOKIN_OPENAI_API_KEY"];

pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>> {
    let provider_name = config.provider_name();

    match provider_name.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = resolve_api_key_with_fallback(GEMINI_KEY_VARS, &config.api_key)?;
            let mut provider = GeminiProvider::new(api_key)
                .with_model(config.model.clone())
                .with_temperature(config.temperature);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Box::new(provider))
        }
        "openai" => {
            let api_key = resolve_api_key_with_fallback(OPENAI_KEY_VARS, &config.api_key)?;
            let mut provider = OpenAIProvider::new(api_key)
                .with_model(config.model.clone())
                .with_temperature(config.temperature);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Box::new(provider))
        }
        _ => Err(BotError::Configuration(format!(
            "Unknown provider: {}. Available: gemini, openai",
            provider_name
        ))),
    }
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.trim().is_empty()
        {
            return Ok(key);
        }
    }

    if !config_key.trim().is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(BotError::Configuration(format!(
            "No API key found. Set {} or add api_key to the config file.",
            env_vars.join(" or ")
        )))
    }
}
