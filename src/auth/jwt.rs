//! JWT session tokens
//!
//! Issues and validates the HS256 access tokens handed out by the in-memory
//! identity backend.

use crate::auth::backend::BackendError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issued token, used to revoke a single session
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// Keys stay out of Debug output
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"<hidden>")
            .field("decoding_key", &"<hidden>")
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn generate_access_token(&self, claims: &Claims) -> Result<String, BackendError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| BackendError::UnexpectedResponse(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, BackendError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => BackendError::SessionExpired,
                _ => BackendError::Rejected {
                    status: 401,
                    message: format!("Invalid access token: {}", e),
                },
            })
    }
}
