use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{DaydreamError, Result};

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Main configuration structure loaded from daydream.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub concepts: ConceptsConfig,
    pub model: ModelConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// HTTP surface
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_bind: SocketAddr,
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            route: "/api/daydream".to_string(),
        }
    }
}

/// Where the candidate concept pool comes from
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConceptsConfig {
    pub seeds_path: PathBuf,
}

impl Default for ConceptsConfig {
    fn default() -> Self {
        Self {
            seeds_path: PathBuf::from("scraper/wiki_seeds.csv"),
        }
    }
}

/// Text-generation provider settings. The credential is never configured
/// here; it arrives with each run request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// "openai" | "fake"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "o4-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Runtime-only settings (environment)
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub log_level: Option<String>,
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").ok(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses DAYDREAM_CONFIG or defaults to "daydream.toml"
    pub fn load() -> Result<Self> {
        // DAYDREAM_ENV_FILE if set, else ./.env; a missing file is fine
        if let Ok(env_path) = std::env::var("DAYDREAM_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path =
            std::env::var("DAYDREAM_CONFIG").unwrap_or_else(|_| "daydream.toml".to_string());

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(_) => {
                tracing::warn!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(bind) = std::env::var("DAYDREAM_HTTP_BIND") {
            self.server.http_bind = bind.parse().map_err(|e| {
                DaydreamError::config(format!("invalid DAYDREAM_HTTP_BIND '{}': {}", bind, e))
            })?;
            tracing::debug!("DAYDREAM_HTTP_BIND env override applied");
        }
        if let Ok(path) = std::env::var("DAYDREAM_SEEDS_PATH") {
            self.concepts.seeds_path = PathBuf::from(path);
            tracing::debug!("DAYDREAM_SEEDS_PATH env override applied");
        }
        if let Ok(provider) = std::env::var("DAYDREAM_PROVIDER") {
            self.model.provider = provider;
        }
        if let Ok(model) = std::env::var("DAYDREAM_MODEL") {
            self.model.model = model;
        }
        if let Ok(base_url) = std::env::var("DAYDREAM_BASE_URL") {
            self.model.base_url = base_url;
        }
        if let Some(timeout) = std::env::var("DAYDREAM_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.model.request_timeout_ms = timeout;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<()> {
        match self.model.provider.as_str() {
            "openai" | "fake" => {}
            other => {
                return Err(DaydreamError::config(format!(
                    "unknown model provider '{}' (expected 'openai' or 'fake')",
                    other
                )));
            }
        }
        if self.model.model.trim().is_empty() {
            return Err(DaydreamError::config("model name must not be empty"));
        }
        if !self.model.base_url.starts_with("http://") && !self.model.base_url.starts_with("https://")
        {
            return Err(DaydreamError::config(format!(
                "model base_url '{}' must start with http:// or https://",
                self.model.base_url
            )));
        }
        if self.model.request_timeout_ms == 0 {
            tracing::warn!(
                "request_timeout_ms of 0 is not usable, falling back to {}",
                DEFAULT_REQUEST_TIMEOUT_MS
            );
            self.model.request_timeout_ms = DEFAULT_REQUEST_TIMEOUT_MS;
        }
        if !self.server.route.starts_with('/') {
            self.server.route = format!("/{}", self.server.route);
        }
        Ok(())
    }

    /// Filter directive for tracing-subscriber
    pub fn log_filter(&self) -> &str {
        self.runtime
            .log_level
            .as_deref()
            .unwrap_or("daydream=info,tower_http=info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [model]
            model = "gpt-4o-mini"

            [concepts]
            seeds_path = "data/seeds.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.provider, "openai");
        assert_eq!(config.concepts.seeds_path, PathBuf::from("data/seeds.csv"));
        assert_eq!(config.server.route, "/api/daydream");
        assert_eq!(config.server.http_bind.port(), 8787);
    }

    #[test]
    fn validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.model.provider = "carrier-pigeon".into();
        assert!(matches!(
            config.validate(),
            Err(DaydreamError::Config { .. })
        ));
    }

    #[test]
    fn validate_repairs_timeout_and_route() {
        let mut config = Config::default();
        config.model.request_timeout_ms = 0;
        config.server.route = "dream".into();
        config.validate().unwrap();
        assert_eq!(config.model.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.server.route, "/dream");
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.model.base_url = "api.openai.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_log_filter() {
        let config = Config::default();
        assert_eq!(config.log_filter(), "daydream=info,tower_http=info");
    }
}
