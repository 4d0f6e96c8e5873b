//! In-memory [`ProfileStore`] implementation.
//!
//! Profiles live in a `HashMap` behind `std::sync::RwLock`; each profile has
//! its own `Mutex`, so writes for one user never block another. Nothing is
//! persisted: profiles last as long as the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::models::{ListingId, ProfileUpdate, UserId, UserProfile};

use super::ProfileStore;

type Slot = Arc<Mutex<UserProfile>>;

/// Process-lifetime profile store.
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<UserId, Slot>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Number of users seen so far.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_map()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read_map(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, Slot>>> {
        self.profiles
            .read()
            .map_err(|_| anyhow!("profile map lock poisoned"))
    }

    /// The user's slot, created on first use.
    fn slot(&self, user_id: UserId) -> Result<Slot> {
        if let Some(slot) = self.read_map()?.get(&user_id) {
            return Ok(Arc::clone(slot));
        }
        let mut map = self
            .profiles
            .write()
            .map_err(|_| anyhow!("profile map lock poisoned"))?;
        let slot = map.entry(user_id).or_insert_with(|| {
            debug!(user_id, "created profile");
            Arc::new(Mutex::new(UserProfile::new(user_id)))
        });
        Ok(Arc::clone(slot))
    }

    /// Run `f` with exclusive access to the user's profile.
    fn with_profile<T>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut UserProfile) -> Result<T>,
    ) -> Result<T> {
        let slot = self.slot(user_id)?;
        let mut profile = slot
            .lock()
            .map_err(|_| anyhow!("profile lock poisoned for user {}", user_id))?;
        f(&mut profile)
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        let slot = match self.read_map()?.get(&user_id) {
            Some(slot) => Arc::clone(slot),
            None => return Ok(None),
        };
        let profile = slot
            .lock()
            .map_err(|_| anyhow!("profile lock poisoned for user {}", user_id))?;
        Ok(Some(profile.clone()))
    }

    fn merge(&self, user_id: UserId, update: &ProfileUpdate) -> Result<UserProfile> {
        self.with_profile(user_id, |profile| {
            profile.apply(update)?;
            Ok(profile.clone())
        })
    }

    fn record_rating(
        &self,
        user_id: UserId,
        listing_id: ListingId,
        rating: u8,
    ) -> Result<UserProfile> {
        self.with_profile(user_id, |profile| {
            profile.rate(listing_id, rating)?;
            debug!(user_id, listing_id, rating, "recorded rating");
            Ok(profile.clone())
        })
    }
}
