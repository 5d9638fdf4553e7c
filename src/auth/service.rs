//! Credential flows
//!
//! Signup and change-password both gate on the password policy and on the
//! confirmation match before any identity backend call is made. Passing the
//! gate does not guarantee the backend accepts the credential; its errors are
//! returned as-is.
//!
//! Profile rows are best effort: signup inserts one, and sign-in recreates it
//! when the insert was lost. Neither failure blocks the credential flow.

use crate::auth::backend::{AuthBackend, Session, SignUpResult};
use crate::auth::dto::{ChangePasswordRequest, SignUpRequest};
use crate::auth::error::AuthError;
use crate::auth::password::{self, PasswordRequirements};
use crate::auth::BackendError;
use crate::user::{NewProfile, ProfileRepository};
use std::sync::Arc;
use validator::Validate;

/// Check a candidate and its confirmation before it may leave the service
fn check_candidate(
    candidate: &str,
    confirmation: &str,
    mismatch: &'static str,
) -> Result<PasswordRequirements, AuthError> {
    if candidate != confirmation {
        return Err(AuthError::PasswordMismatch(mismatch));
    }

    let requirements = password::evaluate(candidate);
    if !password::is_valid(&requirements) {
        return Err(AuthError::PolicyNotMet(requirements));
    }

    Ok(requirements)
}

/// Service running the signup, login and change-password flows
#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            backend,
            profiles,
        }
    }

    /// Evaluate a candidate for live checklist feedback
    pub fn evaluate_password(&self, candidate: &str) -> PasswordRequirements {
        password::evaluate(candidate)
    }

    /// Create an account, then its storefront profile
    ///
    /// A failed profile insert is logged and does not fail the signup.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResult, AuthError> {
        request.validate()?;
        check_candidate(&request.password, &request.confirm_password, AuthError::SIGN_UP_MISMATCH)?;

        let result = self.backend.sign_up(&request.email, &request.password).await?;
        log::info!("Account {} created", result.account.id);

        let profile = NewProfile::for_account(&result.account);
        let access_token = result.session.as_ref().map(|s| s.access_token.as_str());
        if let Err(e) = self.profiles.create_profile(&profile, access_token).await {
            log::warn!("Profile creation failed for account {}: {}", result.account.id, e);
        }

        Ok(result)
    }

    /// Exchange credentials for a session; no policy gate applies
    ///
    /// A missing profile row is recreated before the session is returned.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.backend.sign_in(email, password).await?;
        log::info!("Account {} signed in", session.account.id);

        self.ensure_profile(&session).await;
        Ok(session)
    }

    /// Revoke the session behind a bearer token
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.backend.sign_out(access_token).await?;
        log::info!("Session signed out");
        Ok(())
    }

    async fn ensure_profile(&self, session: &Session) {
        let account_id = session.account.id;
        let access_token = Some(session.access_token.as_str());

        match self.profiles.get_profile(account_id, access_token).await {
            Ok(Some(_)) => {},
            Ok(None) => {
                let profile = NewProfile::for_account(&session.account);
                match self.profiles.create_profile(&profile, access_token).await {
                    Ok(()) => log::info!("Recreated missing profile for account {}", account_id),
                    Err(e) => {
                        log::warn!("Profile recreation failed for account {}: {}", account_id, e)
                    },
                }
            },
            Err(e) => log::warn!("Profile lookup failed for account {}: {}", account_id, e),
        }
    }

    /// Resolve a bearer token into the session it represents
    pub async fn session_from_token(&self, access_token: &str) -> Result<Session, AuthError> {
        let account = self.backend.current_account(access_token).await?;

        Ok(Session {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
            account,
        })
    }

    /// Replace the session account's password
    pub async fn change_password(
        &self,
        session: &Session,
        request: &ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        Self::gate_password_change(request)?;
        self.apply_password_change(session, request).await
    }

    /// Replace the password of the account behind a bearer token
    ///
    /// The local gate runs before the token is resolved, so a rejected
    /// candidate causes no backend traffic at all.
    pub async fn change_password_with_token(
        &self,
        access_token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        Self::gate_password_change(request)?;
        let session = self.session_from_token(access_token).await?;
        self.apply_password_change(&session, request).await
    }

    fn gate_password_change(request: &ChangePasswordRequest) -> Result<(), AuthError> {
        request.validate()?;
        check_candidate(
            &request.new_password,
            &request.confirm_password,
            AuthError::CHANGE_MISMATCH,
        )?;
        Ok(())
    }

    async fn apply_password_change(
        &self,
        session: &Session,
        request: &ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        if let Some(current) = request.current_password.as_deref() {
            match self.backend.sign_in(&session.account.email, current).await {
                Ok(_) => {},
                Err(BackendError::InvalidCredentials) => {
                    return Err(AuthError::CurrentPasswordIncorrect)
                },
                Err(e) => return Err(e.into()),
            }
        }

        self.backend.update_password(session, &request.new_password).await?;
        log::info!("Password updated for account {}", session.account.id);
        Ok(())
    }
}
