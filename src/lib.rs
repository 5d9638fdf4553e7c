//! Velo Auth Service
//!
//! Credential service for the bicycle storefront, built with Actix-web.
//! Evaluates passwords against the shop's password policy, gates signup and
//! password changes on it, and forwards accepted credentials to the hosted
//! identity backend.

pub mod auth;
pub mod config;
pub mod mocks;
pub mod simple_health;
pub mod startup;
pub mod types;
pub mod user;

// Re-export commonly used types and functions
pub use auth::password::{evaluate, is_valid, PasswordRequirements};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "velo-auth";
