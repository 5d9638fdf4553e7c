//! In-memory profile store

use crate::user::{NewProfile, Profile, ProfileError, ProfileRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<Uuid, NewProfile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Uuid) -> Option<NewProfile> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create_profile(
        &self,
        profile: &NewProfile,
        _access_token: Option<&str>,
    ) -> Result<(), ProfileError> {
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        if profiles.contains_key(&profile.id) {
            return Err(ProfileError::AlreadyExists(profile.id));
        }

        profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn get_profile(
        &self,
        id: Uuid,
        _access_token: Option<&str>,
    ) -> Result<Option<Profile>, ProfileError> {
        Ok(self.get(&id).map(Profile::from))
    }
}
