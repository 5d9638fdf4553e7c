//! Configuration management for velo_auth
//!
//! Layers built-in defaults, an optional `configuration/base.toml` and
//! `APP_`-prefixed environment variables (nested keys joined with `__`,
//! e.g. `APP_BACKEND__API_KEY`), then validates the result.

use crate::types::{AppConfig, BackendKind, StartupError};
use ::config::{Config, Environment, File};

/// Load complete app configuration
pub fn load_config() -> Result<AppConfig, StartupError> {
    let settings = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.keep_alive_secs", 30)?
        .set_default("backend.kind", "hosted")?
        .set_default("backend.timeout_ms", 10_000)?
        .set_default("backend.session_minutes", 60)?
        .set_default("cors.allowed_origins", Vec::<String>::new())?
        .set_default("log_level", "info")?
        .add_source(File::with_name("configuration/base").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    validate_config(&config)?;

    Ok(config)
}

/// Reject configurations the service cannot start with
pub fn validate_config(config: &AppConfig) -> Result<(), StartupError> {
    if config.server.host.trim().is_empty() {
        return Err(StartupError::Config("Server host can't be empty".to_string()));
    }

    let backend = &config.backend;
    if backend.timeout_ms == 0 {
        return Err(StartupError::Config("Backend timeout must be positive".to_string()));
    }

    match backend.kind {
        BackendKind::Hosted => {
            if is_blank(&backend.url) {
                return Err(StartupError::Config("Hosted backend requires a url".to_string()));
            }
            if is_blank(&backend.api_key) {
                return Err(StartupError::Config("Hosted backend requires an api key".to_string()));
            }
        },
        BackendKind::Memory => {
            if is_blank(&backend.jwt_secret) {
                return Err(StartupError::Config(
                    "Memory backend requires a jwt secret".to_string(),
                ));
            }
            if backend.session_minutes <= 0 {
                return Err(StartupError::Config(
                    "Session lifetime must be positive".to_string(),
                ));
            }
        },
    }

    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}
