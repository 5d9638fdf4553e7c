//! Credential flow errors
//!
//! Pre-submission failures (mismatch, policy, malformed input) are raised
//! locally and never reach the identity backend. Backend failures are passed
//! through unchanged.

use crate::auth::backend::BackendError;
use crate::auth::password::{PasswordRequirements, Requirement};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<PasswordRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmet: Option<Vec<Requirement>>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    PasswordMismatch(&'static str),

    #[error("Password does not meet requirements")]
    PolicyNotMet(PasswordRequirements),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("The current password is incorrect")]
    CurrentPasswordIncorrect,

    #[error("Missing or malformed bearer token")]
    MissingToken,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AuthError {
    pub const SIGN_UP_MISMATCH: &'static str = "Passwords do not match";
    pub const CHANGE_MISMATCH: &'static str = "New passwords do not match";

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PasswordMismatch(_) => StatusCode::BAD_REQUEST,
            AuthError::PolicyNotMet(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // The bearer session is still valid, so this is not a 401
            AuthError::CurrentPasswordIncorrect => StatusCode::BAD_REQUEST,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::Backend(error) => match error {
                BackendError::EmailAlreadyRegistered => StatusCode::CONFLICT,
                BackendError::WeakPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BackendError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                BackendError::SessionExpired => StatusCode::UNAUTHORIZED,
                BackendError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                BackendError::Rejected {
                    status, ..
                } => StatusCode::from_u16(*status)
                    .ok()
                    .filter(StatusCode::is_client_error)
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                BackendError::Network(_) => StatusCode::BAD_GATEWAY,
                BackendError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::PasswordMismatch(_) => "PASSWORDS_DO_NOT_MATCH",
            AuthError::PolicyNotMet(_) => "PASSWORD_POLICY_NOT_MET",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::CurrentPasswordIncorrect => "CURRENT_PASSWORD_INCORRECT",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::Backend(error) => match error {
                BackendError::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
                BackendError::WeakPassword(_) => "WEAK_PASSWORD",
                BackendError::InvalidCredentials => "INVALID_CREDENTIALS",
                BackendError::SessionExpired => "SESSION_EXPIRED",
                BackendError::RateLimited => "RATE_LIMIT_EXCEEDED",
                BackendError::Rejected {
                    ..
                } => "BACKEND_REJECTED",
                BackendError::Network(_) => "BACKEND_UNAVAILABLE",
                BackendError::UnexpectedResponse(_) => "BACKEND_UNEXPECTED_RESPONSE",
            },
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let requirements = match self {
            AuthError::PolicyNotMet(requirements) => Some(*requirements),
            _ => None,
        };

        ErrorResponse {
            status: self.status_code().as_u16(),
            message: self.to_string(),
            code: Some(self.error_code().to_string()),
            requirements,
            unmet: requirements.map(|r| r.unmet()),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut error_messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match error.message.as_ref() {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, error.code),
                })
            })
            .collect();
        error_messages.sort();

        AuthError::Validation(error_messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::evaluate;

    #[test]
    fn test_local_errors_status_codes() {
        assert_eq!(
            AuthError::PasswordMismatch(AuthError::SIGN_UP_MISMATCH).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::PolicyNotMet(evaluate("short")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::CurrentPasswordIncorrect.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_backend_errors_pass_through() {
        let error = AuthError::from(BackendError::EmailAlreadyRegistered);
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
        assert_eq!(error.to_string(), "Email already registered");

        let error = AuthError::from(BackendError::Network("timed out".to_string()));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_rejected_status_is_kept_for_client_errors_only() {
        let error = AuthError::from(BackendError::Rejected {
            status: 422,
            message: "same_password".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let error = AuthError::from(BackendError::Rejected {
            status: 503,
            message: "maintenance".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_policy_response_lists_unmet_rules() {
        let response = AuthError::PolicyNotMet(evaluate("Password_1")).to_response();

        assert_eq!(response.status, 422);
        assert_eq!(response.message, "Password does not meet requirements");
        assert_eq!(response.code.as_deref(), Some("PASSWORD_POLICY_NOT_MET"));
        assert_eq!(response.unmet, Some(vec![Requirement::HasSymbol]));
    }

    #[test]
    fn test_mismatch_messages() {
        assert_eq!(
            AuthError::PasswordMismatch(AuthError::SIGN_UP_MISMATCH).to_string(),
            "Passwords do not match"
        );
        assert_eq!(
            AuthError::PasswordMismatch(AuthError::CHANGE_MISMATCH).to_string(),
            "New passwords do not match"
        );
    }
}
