use crate::analytics::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// State backend configuration
    pub state: StateConfig,

    /// Analytics engine configuration
    #[serde(default)]
    pub analytics: EngineConfig,

    /// Forecasting collaborator configuration
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: ODS_)
            .add_source(
                config::Environment::with_prefix("ODS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StateConfig {
    /// State backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Sled,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Whether the generative forecasting collaborator is enabled.
    /// When disabled (or when calls fail), a low-risk placeholder
    /// forecast is substituted.
    #[serde(default)]
    pub enabled: bool,

    /// API key for the generative endpoint
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_forecast_model")]
    pub model: String,

    /// Base URL of the generative endpoint
    #[serde(default = "default_forecast_endpoint")]
    pub endpoint: String,

    /// HTTP timeout (seconds)
    #[serde(default = "default_forecast_timeout")]
    pub timeout_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: default_forecast_model(),
            endpoint: default_forecast_endpoint(),
            timeout_secs: default_forecast_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_forecast_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_forecast_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_forecast_timeout() -> u64 {
    30
}
