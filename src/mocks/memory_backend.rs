//! In-memory identity backend
//!
//! Stands in for the hosted identity service during local development and
//! tests. Accounts are keyed by lower-cased email, credentials are stored as
//! Argon2 hashes and sessions are HS256 JWTs. Signed-out tokens are remembered
//! by their `jti` until the process exits.

use crate::auth::backend::{Account, AuthBackend, BackendError, Session, SignUpResult};
use crate::auth::jwt::{Claims, JwtService};
use crate::auth::password::security::PasswordService;
use async_trait::async_trait;
use chrono::Duration;
use rand::{distributions::Alphanumeric, Rng};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Server-side floor enforced independently of the storefront policy
pub const BACKEND_MIN_PASSWORD_LENGTH: usize = 6;

struct StoredAccount {
    id: Uuid,
    email: String,
    password_hash: String,
}

pub struct InMemoryAuthBackend {
    accounts: RwLock<HashMap<String, StoredAccount>>,
    revoked: RwLock<HashSet<Uuid>>,
    jwt: JwtService,
    session_lifetime: Duration,
}

impl InMemoryAuthBackend {
    pub fn new(jwt_secret: &str, session_lifetime: Duration) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            revoked: RwLock::new(HashSet::new()),
            jwt: JwtService::new(jwt_secret),
            session_lifetime,
        }
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn check_backend_floor(password: &str) -> Result<(), BackendError> {
        if password.chars().count() < BACKEND_MIN_PASSWORD_LENGTH {
            return Err(BackendError::WeakPassword(format!(
                "Password should be at least {} characters",
                BACKEND_MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    async fn hash(password: &str) -> Result<String, BackendError> {
        let password = password.to_string();
        run_blocking(move || PasswordService::hash_password(&password))
            .await?
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))
    }

    async fn verify(password: &str, password_hash: String) -> Result<bool, BackendError> {
        let password = password.to_string();
        run_blocking(move || PasswordService::verify_password(&password, &password_hash))
            .await?
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))
    }

    fn issue_session(&self, account: Account) -> Result<Session, BackendError> {
        let claims = Claims::new(account.id, &account.email, self.session_lifetime);
        let access_token = self.jwt.generate_access_token(&claims)?;
        let refresh_token: String =
            rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();

        Ok(Session {
            access_token,
            refresh_token: Some(refresh_token),
            expires_at: claims.expires_at(),
            account,
        })
    }

    /// Resolve a token to its stored account, keyed by email
    fn account_for_token(&self, access_token: &str) -> Result<(String, Account), BackendError> {
        let claims = self.jwt.validate_access_token(access_token)?;
        if self.revoked.read().unwrap_or_else(PoisonError::into_inner).contains(&claims.jti) {
            return Err(BackendError::SessionExpired);
        }

        let key = Self::normalize(&claims.email);
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);

        match accounts.get(&key) {
            Some(stored) if stored.id == claims.sub => Ok((
                key,
                Account {
                    id: stored.id,
                    email: stored.email.clone(),
                },
            )),
            _ => Err(BackendError::SessionExpired),
        }
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResult, BackendError> {
        Self::check_backend_floor(password)?;
        let key = Self::normalize(email);
        let password_hash = Self::hash(password).await?;

        let account = {
            let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
            if accounts.contains_key(&key) {
                return Err(BackendError::EmailAlreadyRegistered);
            }

            let stored = StoredAccount {
                id: Uuid::new_v4(),
                email: key.clone(),
                password_hash,
            };
            let account = Account {
                id: stored.id,
                email: stored.email.clone(),
            };
            accounts.insert(key, stored);
            account
        };

        let session = self.issue_session(account.clone())?;
        Ok(SignUpResult {
            account,
            session: Some(session),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let key = Self::normalize(email);
        let (account, password_hash) = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            let stored = accounts.get(&key).ok_or(BackendError::InvalidCredentials)?;
            (
                Account {
                    id: stored.id,
                    email: stored.email.clone(),
                },
                stored.password_hash.clone(),
            )
        };

        if !Self::verify(password, password_hash).await? {
            return Err(BackendError::InvalidCredentials);
        }

        self.issue_session(account)
    }

    async fn current_account(&self, access_token: &str) -> Result<Account, BackendError> {
        self.account_for_token(access_token).map(|(_, account)| account)
    }

    async fn update_password(
        &self,
        session: &Session,
        new_password: &str,
    ) -> Result<(), BackendError> {
        let (key, account) = self.account_for_token(&session.access_token)?;
        if account.id != session.account.id {
            return Err(BackendError::SessionExpired);
        }

        Self::check_backend_floor(new_password)?;
        let password_hash = Self::hash(new_password).await?;

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        match accounts.get_mut(&key) {
            Some(stored) => {
                stored.password_hash = password_hash;
                Ok(())
            },
            None => Err(BackendError::SessionExpired),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let claims = self.jwt.validate_access_token(access_token)?;
        self.revoked.write().unwrap_or_else(PoisonError::into_inner).insert(claims.jti);
        Ok(())
    }
}

/// Run CPU-heavy work (Argon2) on the blocking pool instead of a runtime worker
async fn run_blocking<F, R>(f: F) -> Result<R, BackendError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackendError::UnexpectedResponse(format!("Blocking task failed: {}", e)))
}
