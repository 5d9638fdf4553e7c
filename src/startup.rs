//! Application wiring
//!
//! Builds the identity backend selected by configuration and assembles the
//! actix-web application around it.

use crate::auth::routes::configure_auth_routes;
use crate::auth::{AuthError, AuthService, HostedAuthBackend};
use crate::mocks::{InMemoryAuthBackend, InMemoryProfileRepository};
use crate::simple_health::simple_health;
use crate::types::{AppConfig, BackendConfig, BackendKind, CorsConfig, StartupError};
use crate::user::HostedProfileRepository;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

/// Build the credential service for the configured backend
pub fn build_auth_service(config: &BackendConfig) -> Result<AuthService, StartupError> {
    match config.kind {
        BackendKind::Hosted => {
            let url = config.url.clone().unwrap_or_default();
            let api_key = config.api_key.clone().unwrap_or_default();

            let backend = HostedAuthBackend::new(url.clone(), api_key.clone(), config.timeout())
                .map_err(|e| StartupError::Backend(e.to_string()))?;
            let profiles = HostedProfileRepository::new(url, api_key, config.timeout())
                .map_err(|e| StartupError::Backend(e.to_string()))?;

            log::info!("Using hosted identity backend at {:?}", config.url);
            Ok(AuthService::new(Arc::new(backend), Arc::new(profiles)))
        },
        BackendKind::Memory => {
            let secret = config.jwt_secret.clone().unwrap_or_default();
            let backend = InMemoryAuthBackend::new(
                &secret,
                chrono::Duration::minutes(config.session_minutes),
            );

            log::warn!("Using in-memory identity backend; accounts are lost on restart");
            Ok(AuthService::new(Arc::new(backend), Arc::new(InMemoryProfileRepository::new())))
        },
    }
}

/// Routes, shared state and extractor configuration for the app
pub fn configure_app(service: AuthService) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| AuthError::Validation(err.to_string()).into());

        cfg.app_data(web::Data::new(service.clone()))
            .app_data(json_config)
            .service(configure_auth_routes())
            .route("/health", web::get().to(simple_health));
    }
}

fn cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600);

    for origin in &config.allowed_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Bind the HTTP server
pub fn run(config: &AppConfig, service: AuthService) -> Result<Server, StartupError> {
    let app = configure_app(service);
    let cors_config = config.cors.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_config))
            .wrap(Logger::default())
            .configure(app.clone())
    })
    .keep_alive(config.server.keep_alive());

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    let server = server.bind((config.server.host.as_str(), config.server.port))?.run();
    log::info!("Listening on {}:{}", config.server.host, config.server.port);

    Ok(server)
}
