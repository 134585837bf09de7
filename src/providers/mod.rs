//! Provider bootstrap from the environment.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chat_provider::ChatProvider;
use chat_provider_gemini::{GeminiProvider, GeminiProviderConfig, GEMINI_PROVIDER_ID};
use chat_provider_mock::{MockChatProvider, MOCK_PROVIDER_ID};
use serde::Deserialize;

pub const DEFAULT_PROVIDER_ID: &str = GEMINI_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "CODA_PROVIDER";
pub const CONFIG_PATH_ENV_VAR: &str = "CODA_CONFIG_PATH";

/// Host configuration file contract. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Advertised model inventory override.
    #[serde(default)]
    pub models: Vec<String>,
    /// Startup model selection.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Must be > 0 when provided.
    #[serde(default)]
    pub timeout_sec: Option<u64>,
}

impl HostConfig {
    /// Loads the config file named by `CODA_CONFIG_PATH`, or the default
    /// configuration when the variable is unset.
    pub fn from_env() -> Result<Self, String> {
        let path = std::env::var(CONFIG_PATH_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        match path {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config file {}: {error}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|error| format!("Invalid config file {}: {error}", path.display()))?;

        if config.timeout_sec == Some(0) {
            return Err(format!(
                "Config file {}: timeout_sec must be > 0",
                path.display()
            ));
        }

        Ok(config)
    }
}

pub fn provider_from_env(config: &HostConfig) -> Result<Arc<dyn ChatProvider>, String> {
    let provider_id = std::env::var(PROVIDER_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    provider_for_id(provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID), config)
}

pub fn provider_for_id(
    provider_id: &str,
    config: &HostConfig,
) -> Result<Arc<dyn ChatProvider>, String> {
    match provider_id {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockChatProvider::default())),
        GEMINI_PROVIDER_ID => {
            let mut gemini = GeminiProviderConfig::new(config.models.clone());
            if let Some(base_url) = &config.base_url {
                gemini = gemini.with_base_url(base_url.clone());
            }
            if let Some(timeout_sec) = config.timeout_sec {
                gemini = gemini.with_timeout(Duration::from_secs(timeout_sec));
            }

            let provider = GeminiProvider::new(gemini).map_err(|error| error.to_string())?;
            Ok(Arc::new(provider))
        }
        unknown => Err(format!(
            "Unsupported provider '{unknown}'. Available providers: {GEMINI_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        )),
    }
}
