use crate::error::{PromptError, Result};
use serde::Deserialize;
use std::env;
use std::fs;

pub const PROMPT_PATH: &str = "/api/v2/prompt";

/// Deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:3400",
            Environment::Staging => "https://staging-backend-22790208601.us-central1.run.app",
            Environment::Production => "https://backend-22790208601.us-central1.run.app",
        }
    }

    /// Unknown names fall back to production
    pub fn from_name(name: &str) -> Self {
        match name {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the environment's base URL when set
    #[serde(default)]
    pub base_url: Option<String>,

    /// Stable per-installation identifier
    #[serde(default)]
    pub device_id: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            environment: Environment::default(),
            base_url: Some(base_url.into()),
            device_id: Some(device_id.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = env::var("PROMPT_ENV")
            .map(|name| Environment::from_name(&name))
            .unwrap_or_default();

        Ok(ClientConfig {
            environment,
            base_url: env::var("PROMPT_BASE_URL").ok(),
            device_id: env::var("PROMPT_DEVICE_ID").ok(),
        })
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| PromptError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: ClientConfig = toml::from_str(&contents)
            .map_err(|e| PromptError::Config(format!("Failed to parse config file: {}", e)))?;

        // Allow environment variables to override file config
        if let Ok(base_url) = env::var("PROMPT_BASE_URL") {
            config.base_url = Some(base_url);
        }
        if let Ok(device_id) = env::var("PROMPT_DEVICE_ID") {
            config.device_id = Some(device_id);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url();
        if base_url.is_empty() {
            return Err(PromptError::Config("Base URL is empty".to_string()));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PromptError::Config(format!(
                "Base URL must be http(s): {}",
                base_url
            )));
        }

        if matches!(self.device_id.as_deref(), Some("")) {
            return Err(PromptError::Config("Device ID is empty".to_string()));
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    pub fn prompt_url(&self) -> String {
        format!("{}{}", self.base_url(), PROMPT_PATH)
    }

    /// Per-user endpoint that stops whatever stream is active for `user_id`
    pub fn stop_url(&self, user_id: &str) -> String {
        format!("{}/api/v2/users/{}/prompt/stop", self.base_url(), user_id)
    }

    /// Configured device id, or a fresh UUID when none is set
    pub fn device_id_or_generate(&self) -> String {
        self.device_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}
