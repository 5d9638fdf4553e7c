//! User profile models
//!
//! Shapes of the storefront `profiles` table rows this service reads and writes.

use crate::auth::backend::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile row created for every new account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewProfile {
    /// Minimal profile for a freshly created account
    pub fn for_account(account: &Account) -> Self {
        let now = Utc::now();

        Self {
            id: account.id,
            email: account.email.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile row as stored
///
/// Contact columns are filled in later from the account screen, so every one
/// of them may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<NewProfile> for Profile {
    fn from(profile: NewProfile) -> Self {
        Self {
            id: profile.id,
            email: Some(profile.email),
            first_name: None,
            last_name: None,
            phone_number: None,
            avatar_url: None,
            created_at: Some(profile.created_at),
            updated_at: Some(profile.updated_at),
        }
    }
}
