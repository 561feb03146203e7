use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure for counterpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub profile: DeploymentProfile,
}

/// Static deployment profile controlling the maximum output length. Fixed
/// at configuration time, never runtime-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProfile {
    Lite,
    #[default]
    Standard,
}

impl DeploymentProfile {
    pub fn max_tokens(self) -> u32 {
        match self {
            DeploymentProfile::Lite => 800,
            DeploymentProfile::Standard => 1000,
        }
    }
}

pub const API_KEY_PLACEHOLDER: &str = "PLACEHOLDER_API_KEY";

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// ALWAYS returns a valid config - never fails; a missing credential is
    /// reported when the transport is constructed.
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("COUNTERPOINT_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("COUNTERPOINT_BIND") {
            self.server.bind = bind;
        }
        if let Ok(api_key) = env::var("GROQ_API_KEY") {
            self.provider.api_key = api_key;
        }
        if let Ok(base_url) = env::var("PROVIDER_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Ok(model) = env::var("PROVIDER_MODEL") {
            self.provider.model = model;
        }
        if let Ok(profile) = env::var("PROVIDER_PROFILE") {
            match profile.to_lowercase().as_str() {
                "lite" => self.provider.profile = DeploymentProfile::Lite,
                "standard" => self.provider.profile = DeploymentProfile::Standard,
                other => {
                    tracing::warn!("Unknown PROVIDER_PROFILE '{}' - keeping {:?}", other, self.provider.profile);
                }
            }
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid bind address: {}", self.server.bind).into());
        }
        if self.provider.base_url.is_empty() {
            return Err("Provider base_url cannot be empty".into());
        }
        if self.provider.model.is_empty() {
            return Err("Provider model cannot be empty".into());
        }
        if self.provider.api_key == API_KEY_PLACEHOLDER || self.provider.api_key.is_empty() {
            return Err("GROQ_API_KEY environment variable must be set".into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "counterpoint".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                bind: "127.0.0.1:8790".to_string(),
            },
            provider: ProviderConfig {
                api_key: env::var("GROQ_API_KEY").unwrap_or_else(|_| {
                    tracing::warn!("GROQ_API_KEY not set, using placeholder");
                    API_KEY_PLACEHOLDER.to_string()
                }),
                base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
                model: "llama-3.1-70b-versatile".to_string(),
                profile: DeploymentProfile::default(),
            },
        }
    }
}
