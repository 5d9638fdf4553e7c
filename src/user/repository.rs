//! Profile persistence
//!
//! Profiles live in the hosted platform's relational store and are read and
//! written through its PostgREST endpoint.

use crate::user::error::ProfileError;
use crate::user::models::{NewProfile, Profile};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use uuid::Uuid;

/// Repository trait for storefront profile records
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a profile row, authenticated with the session token when one exists
    async fn create_profile(
        &self,
        profile: &NewProfile,
        access_token: Option<&str>,
    ) -> Result<(), ProfileError>;

    /// Fetch the profile row for an account, `None` when it does not exist
    async fn get_profile(
        &self,
        id: Uuid,
        access_token: Option<&str>,
    ) -> Result<Option<Profile>, ProfileError>;
}

#[derive(Debug, Clone)]
pub struct HostedProfileRepository {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl HostedProfileRepository {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, ProfileError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn profiles_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.base_url)
    }
}

async fn rejected(status: StatusCode, response: reqwest::Response) -> ProfileError {
    let message = response.text().await.unwrap_or_default();
    ProfileError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ProfileRepository for HostedProfileRepository {
    async fn create_profile(
        &self,
        profile: &NewProfile,
        access_token: Option<&str>,
    ) -> Result<(), ProfileError> {
        let response = self
            .http_client
            .post(self.profiles_url())
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token.unwrap_or(&self.api_key))
            .json(&[profile])
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(ProfileError::AlreadyExists(profile.id)),
            status => Err(rejected(status, response).await),
        }
    }

    async fn get_profile(
        &self,
        id: Uuid,
        access_token: Option<&str>,
    ) -> Result<Option<Profile>, ProfileError> {
        let response = self
            .http_client
            .get(self.profiles_url())
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            .header("apikey", &self.api_key)
            .bearer_auth(access_token.unwrap_or(&self.api_key))
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }

        let rows: Vec<Profile> = response
            .json()
            .await
            .map_err(|e| ProfileError::UnexpectedResponse(e.to_string()))?;
        Ok(rows.into_iter().next())
    }
}
