//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.courier/config.json`) and environment.
//! Environment variables override file values for credentials and API base URLs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Channel settings (Telegram).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Completion backend settings (OpenAI).
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// HTTP port for the webhook endpoint (default 8484).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    8484
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config (Telegram is the only channel).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub telegram: TelegramChannelConfig,
}

/// Telegram channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramChannelConfig {
    /// Bot token from BotFather. Overridden by TELEGRAM_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Bot API base URL (default https://api.telegram.org). Overridden by TELEGRAM_API_BASE env.
    pub api_base: Option<String>,
}

/// Completion backend config (OpenAI chat completions).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// OpenAI API key. Overridden by OPENAI_API_KEY env when set.
    pub api_key: Option<String>,
    /// API base URL (default https://api.openai.com/v1). Overridden by OPENAI_API_BASE env.
    pub api_base: Option<String>,
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn config_value(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the Telegram bot token: env TELEGRAM_BOT_TOKEN overrides config.
pub fn resolve_telegram_token(config: &Config) -> Option<String> {
    env_value("TELEGRAM_BOT_TOKEN")
        .or_else(|| config_value(config.channels.telegram.bot_token.as_ref()))
}

/// Resolve the Telegram Bot API base URL override: env TELEGRAM_API_BASE overrides config.
/// None means the client default (https://api.telegram.org).
pub fn resolve_telegram_api_base(config: &Config) -> Option<String> {
    env_value("TELEGRAM_API_BASE")
        .or_else(|| config_value(config.channels.telegram.api_base.as_ref()))
}

/// Resolve the OpenAI API key: env OPENAI_API_KEY overrides config.
pub fn resolve_openai_api_key(config: &Config) -> Option<String> {
    env_value("OPENAI_API_KEY").or_else(|| config_value(config.llm.api_key.as_ref()))
}

/// Resolve the OpenAI API base URL override: env OPENAI_API_BASE overrides config.
/// None means the client default (https://api.openai.com/v1).
pub fn resolve_openai_api_base(config: &Config) -> Option<String> {
    env_value("OPENAI_API_BASE").or_else(|| config_value(config.llm.api_base.as_ref()))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("COURIER_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".courier").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or COURIER_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 8484);
        assert_eq!(g.bind, "127.0.0.1");
    }

    #[test]
    fn parses_camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{
                "gateway": { "port": 9000 },
                "channels": { "telegram": { "botToken": "t", "apiBase": "http://localhost:1" } },
                "llm": { "apiKey": "k" }
            }"#,
        )
        .expect("parse config");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.channels.telegram.bot_token.as_deref(), Some("t"));
        assert_eq!(
            config.channels.telegram.api_base.as_deref(),
            Some("http://localhost:1")
        );
        assert_eq!(config.llm.api_key.as_deref(), Some("k"));
        assert_eq!(config.llm.api_base, None);
    }

    #[test]
    fn blank_config_values_are_treated_as_unset() {
        let mut config = Config::default();
        config.channels.telegram.bot_token = Some("  ".to_string());
        config.llm.api_key = Some(String::new());
        assert_eq!(config_value(config.channels.telegram.bot_token.as_ref()), None);
        assert_eq!(config_value(config.llm.api_key.as_ref()), None);
    }

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let path = std::env::temp_dir()
            .join(format!("courier-config-test-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let (config, used) = load_config(Some(path.clone())).expect("load");
        assert_eq!(used, path);
        assert_eq!(config.gateway.port, 8484);
        assert!(config.channels.telegram.bot_token.is_none());
    }
}
