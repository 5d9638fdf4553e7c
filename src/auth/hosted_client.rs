//! Hosted identity service client
//!
//! Talks to the platform's GoTrue-compatible REST API. Every request carries
//! the project `apikey`; session-scoped requests also carry the bearer token.

use crate::auth::backend::{Account, AuthBackend, BackendError, Session, SignUpResult};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

/// Signup answers with a full session when email confirmation is disabled,
/// and with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> String {
        self.msg
            .as_ref()
            .or(self.message.as_ref())
            .or(self.error_description.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| "no error message".to_string())
    }
}

/// Which endpoint produced an error, since status codes mean different things per call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    SignUp,
    SignIn,
    Session,
}

#[derive(Debug, Clone)]
pub struct HostedAuthBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthBackend {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, BackendError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn check(response: Response, call: Call) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        log::debug!("identity service returned {} for {:?}: {:?}", status, call, body);
        Err(map_error(status, &body, call))
    }
}

fn map_error(status: StatusCode, body: &ErrorBody, call: Call) -> BackendError {
    match body.error_code.as_deref() {
        Some("user_already_exists") | Some("email_exists") => {
            return BackendError::EmailAlreadyRegistered
        },
        Some("weak_password") => return BackendError::WeakPassword(body.message()),
        Some("invalid_credentials") => return BackendError::InvalidCredentials,
        Some("session_expired") | Some("session_not_found") | Some("bad_jwt") => {
            return BackendError::SessionExpired
        },
        _ => {},
    }

    match (status, call) {
        (StatusCode::TOO_MANY_REQUESTS, _) => BackendError::RateLimited,
        (StatusCode::BAD_REQUEST, Call::SignIn) => BackendError::InvalidCredentials,
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, Call::Session) => {
            BackendError::SessionExpired
        },
        _ => BackendError::Rejected {
            status: status.as_u16(),
            message: body.message(),
        },
    }
}

fn network_error(error: reqwest::Error) -> BackendError {
    BackendError::Network(error.to_string())
}

/// Build the account, falling back to the submitted email when the user
/// object omits it. An account without any email cannot be re-authenticated.
fn into_account(user: UserResponse, fallback_email: Option<&str>) -> Result<Account, BackendError> {
    let email = user
        .email
        .filter(|email| !email.is_empty())
        .or_else(|| fallback_email.map(str::to_string))
        .ok_or_else(|| {
            BackendError::UnexpectedResponse(format!("User {} has no email address", user.id))
        })?;

    Ok(Account {
        id: user.id,
        email,
    })
}

fn into_session(token: TokenResponse, fallback_email: &str) -> Result<Session, BackendError> {
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: token.expires_in.map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
        account: into_account(token.user, Some(fallback_email))?,
    })
}

#[async_trait]
impl AuthBackend for HostedAuthBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResult, BackendError> {
        let response = self
            .http_client
            .post(self.url("signup"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        let response = Self::check(response, Call::SignUp).await?;
        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))?;

        Ok(match body {
            SignUpResponse::Session(token) => {
                let session = into_session(token, email)?;
                SignUpResult {
                    account: session.account.clone(),
                    session: Some(session),
                }
            },
            SignUpResponse::User(user) => SignUpResult {
                account: into_account(user, Some(email))?,
                session: None,
            },
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let response = self
            .http_client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        let response = Self::check(response, Call::SignIn).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))?;

        into_session(token, email)
    }

    async fn current_account(&self, access_token: &str) -> Result<Account, BackendError> {
        let response = self
            .http_client
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        let response = Self::check(response, Call::Session).await?;
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))?;

        into_account(user, None)
    }

    async fn update_password(
        &self,
        session: &Session,
        new_password: &str,
    ) -> Result<(), BackendError> {
        let response = self
            .http_client
            .put(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await
            .map_err(network_error)?;

        Self::check(response, Call::Session).await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .http_client
            .post(self.url("logout"))
            .query(&[("scope", "local")])
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        Self::check(response, Call::Session).await?;
        Ok(())
    }
}
