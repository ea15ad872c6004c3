use anyhow::{Context, Result};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "openai/gpt-oss-20b:free";
const DEFAULT_AGENT_PROGRAM: &str = "python3";
const DEFAULT_AGENT_SCRIPT: &str = "agent/agent.py";

/// Application configuration loaded from environment variables.
/// The OpenRouter key is optional at startup; notes calls fail per request without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openai_base_url: String,
    pub model_name: String,
    pub agent_program: String,
    pub agent_script: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OpenRouter API key not configured.")]
    MissingCredential,
}

/// The credential bundle handed to each worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model_name: env_or("MODEL_NAME", DEFAULT_MODEL),
            agent_program: env_or("AGENT_PROGRAM", DEFAULT_AGENT_PROGRAM),
            agent_script: env_or("AGENT_SCRIPT", DEFAULT_AGENT_SCRIPT),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Builds the per-call worker bundle. Fails when no credential was configured.
    pub fn worker_config(&self) -> Result<WorkerConfig, ConfigError> {
        let api_key = self
            .openrouter_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        Ok(WorkerConfig {
            api_key: api_key.to_string(),
            base_url: self.openai_base_url.clone(),
            model: self.model_name.clone(),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
pub(crate) fn test_config(api_key: Option<&str>) -> Config {
    Config {
        openrouter_api_key: api_key.map(str::to_string),
        openai_base_url: DEFAULT_BASE_URL.to_string(),
        model_name: DEFAULT_MODEL.to_string(),
        agent_program: "/bin/sh".to_string(),
        agent_script: "worker.sh".to_string(),
        port: 8080,
        rust_log: "debug".to_string(),
    }
}
