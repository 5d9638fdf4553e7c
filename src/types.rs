//! Type definitions for velo_auth
//!
//! Contains the configuration models and startup errors used by the binary
//! and the integration tests.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Application startup errors
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Identity backend error: {0}")]
    Backend(String),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<::config::ConfigError> for StartupError {
    fn from(error: ::config::ConfigError) -> Self {
        StartupError::Config(error.to_string())
    }
}

/// Complete app configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub cors: CorsConfig,
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub keep_alive_secs: u64,
}

impl ServerConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Which identity backend the service talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The hosted platform's REST API
    Hosted,
    /// Process-local accounts for development
    Memory,
}

/// Identity backend configuration
#[derive(Clone, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub jwt_secret: Option<String>,
    pub session_minutes: i64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Secrets stay out of Debug output
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<hidden>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<hidden>"))
            .field("session_minutes", &self.session_minutes)
            .finish()
    }
}

/// Cross-origin configuration for the storefront
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}
