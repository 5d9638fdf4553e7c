//! Credential routes
//!
//! Configuration of the storefront's credential endpoints.

use crate::auth::handlers;
use actix_web::{web, Scope};

/// Configure credential routes under `/auth`
pub fn configure_auth_routes() -> Scope {
    web::scope("/auth")
        // Live password checklist
        .route("/password/evaluate", web::post().to(handlers::evaluate_password))
        // Account creation
        .route("/signup", web::post().to(handlers::sign_up))
        // Email and password sign-in
        .route("/login", web::post().to(handlers::login))
        // End the bearer's session
        .route("/logout", web::post().to(handlers::logout))
        // Change password for the bearer's account
        .route("/password", web::put().to(handlers::change_password))
}
