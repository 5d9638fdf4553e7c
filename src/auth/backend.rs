//! Identity backend boundary
//!
//! Credential storage, session issuance and credential updates live in an
//! external identity service. This module defines the operations the
//! credential flows need from it and the errors it can report.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by the identity backend
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Password rejected by the identity service: {0}")]
    WeakPassword(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Identity service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity service unreachable: {0}")]
    Network(String),

    #[error("Unexpected identity service response: {0}")]
    UnexpectedResponse(String),
}

/// An account known to the identity backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
}

/// An authenticated session, passed explicitly to operations that need it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub account: Account,
}

/// Result of account creation
///
/// `session` is absent when the backend requires email confirmation first.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResult {
    pub account: Account,
    pub session: Option<Session>,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account with email and password
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResult, BackendError>;

    /// Exchange email and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Resolve an access token into the account it belongs to
    async fn current_account(&self, access_token: &str) -> Result<Account, BackendError>;

    /// Replace the credential of the session's account
    async fn update_password(&self, session: &Session, new_password: &str)
        -> Result<(), BackendError>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}
