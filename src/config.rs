//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory when
//! present — every key has a default, so the file itself is optional. Env
//! overrides: `TRIAGE_LOG_LEVEL` for the log level, `LLM_API_KEY` for the
//! backend credential (never sourced from TOML).

use std::env;
use std::path::{Path, PathBuf};
use std::fs;

use serde::Deserialize;

use crate::error::AppError;

/// Paths to the two JSON catalogs.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub diseases: PathBuf,
    pub medicines: PathBuf,
}

/// OpenAI-compatible provider configuration (`[llm.openai]` in the TOML).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Connection timeout in seconds.
    pub timeout_seconds: u64,
}

/// Chat backend configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (e.g. `"dummy"`, `"openai"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other provider sections can coexist without being loaded.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    pub catalog: CatalogConfig,
    pub llm: LlmConfig,
    /// API key from the `LLM_API_KEY` env var — `None` when unset.
    pub llm_api_key: Option<String>,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    bot: RawBot,
    #[serde(default)]
    catalog: RawCatalog,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawBot {
    #[serde(default = "default_bot_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawBot {
    fn default() -> Self {
        Self { name: default_bot_name(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default = "default_diseases_path")]
    diseases: String,
    #[serde(default = "default_medicines_path")]
    medicines: String,
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self { diseases: default_diseases_path(), medicines: default_medicines_path() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_bot_name() -> String { "expert".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_diseases_path() -> String { "data/diseases.json".to_string() }
fn default_medicines_path() -> String { "data/medicines.json".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.ai71.ai/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "tiiuae/falcon-180B-chat".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_openai_timeout_seconds() -> u64 { 60 }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `config/default.toml` (optional), then apply env-var
/// overrides.
pub fn load() -> Result<Config, AppError> {
    let log_level_override = env::var("TRIAGE_LOG_LEVEL").ok();
    let api_key = env::var("LLM_API_KEY").ok();

    let default_path = Path::new("config/default.toml");
    let path = default_path.exists().then_some(default_path);
    load_from(path, log_level_override.as_deref(), api_key)
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: Option<&Path>,
    log_level_override: Option<&str>,
    api_key: Option<String>,
) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    let log_level = log_level_override.unwrap_or(&parsed.bot.log_level).to_string();

    Ok(Config {
        bot_name: parsed.bot.name,
        log_level,
        catalog: CatalogConfig {
            diseases: PathBuf::from(parsed.catalog.diseases),
            medicines: PathBuf::from(parsed.catalog.medicines),
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: api_key,
    })
}
