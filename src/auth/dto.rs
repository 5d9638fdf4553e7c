//! Data Transfer Objects (DTOs) for the credential endpoints
//!
//! Request bodies arrive in camelCase from the storefront. Emails are trimmed
//! while deserializing, so validation sees the value that is forwarded. Types
//! that carry passwords deliberately do not implement `Debug`.

use crate::auth::password::{ChecklistItem, PasswordRequirements};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Live password check request
#[derive(Deserialize)]
pub struct EvaluatePasswordRequest {
    pub password: String,
}

/// Live password check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatePasswordResponse {
    pub requirements: PasswordRequirements,
    pub valid: bool,
    pub checklist: Vec<ChecklistItem>,
}

impl From<PasswordRequirements> for EvaluatePasswordResponse {
    fn from(requirements: PasswordRequirements) -> Self {
        Self {
            requirements,
            valid: requirements.is_valid(),
            checklist: requirements.checklist(),
        }
    }
}

/// Account creation request
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    pub confirm_password: String,
}

/// Account creation response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub account_id: Uuid,
    pub email: String,
    /// True when the account must confirm its email before signing in
    pub confirmation_required: bool,
}

/// Login request
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Change password request
///
/// `current_password` is optional; when present it is re-verified with the
/// identity backend before the credential is replaced.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,

    pub new_password: String,

    pub confirm_password: String,
}

/// Generic message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
