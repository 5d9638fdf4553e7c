//! Authentication module
//!
//! This module provides the storefront's credential capability:
//! - Password policy evaluation and the submission gate
//! - Signup, login and change-password flows
//! - The identity backend boundary and its hosted client
//! - Session tokens for the in-memory backend
//! - HTTP handlers and routes

pub mod backend;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod hosted_client;
pub mod jwt;
pub mod password;
pub mod routes;
pub mod service;

// Re-export commonly used types
pub use backend::{Account, AuthBackend, BackendError, Session, SignUpResult};
pub use error::AuthError;
pub use hosted_client::HostedAuthBackend;
pub use password::{evaluate, is_valid, PasswordRequirements, Requirement};
pub use service::AuthService;
