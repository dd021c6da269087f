// File: src/cache/profile_cache.rs

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::trace;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use teamboard_common::models::StaticProfile;
use teamboard_common::traits::ProfileApi;
use crate::Error;

/// How long a fetched profile is served before it is fetched again.
pub const PROFILE_TTL: Duration = Duration::from_secs(5 * 60);

/// Single cached profile plus the moment it was fetched
#[derive(Debug, Clone)]
struct CacheEntry {
    profile: StaticProfile,
    fetched_at: Instant,
}

/// Keeps static profiles around for `ttl` so each refresh cycle does not
/// spend a rate-limited REST call per account.
///
/// Entries are only ever overwritten on refetch. The key space is the
/// compiled-in roster, so there is no eviction.
pub struct ProfileCache {
    api: Arc<dyn ProfileApi>,
    entries: DashMap<Id<UserMarker>, CacheEntry>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(api: Arc<dyn ProfileApi>) -> Self {
        Self::with_ttl(api, PROFILE_TTL)
    }

    pub fn with_ttl(api: Arc<dyn ProfileApi>, ttl: Duration) -> Self {
        Self {
            api,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached profile if younger than the TTL, otherwise fetches,
    /// stores and returns a fresh one. Fetch errors are returned as-is and
    /// leave the cache untouched.
    pub async fn get(&self, user_id: Id<UserMarker>) -> Result<StaticProfile, Error> {
        if let Some(entry) = self.entries.get(&user_id) {
            if entry.fetched_at.elapsed() < self.ttl {
                trace!("(ProfileCache) hit for {user_id}");
                return Ok(entry.profile.clone());
            }
        }

        trace!("(ProfileCache) miss for {user_id}, fetching");
        let profile = self.api.fetch_profile(user_id).await?;
        self.entries.insert(
            user_id,
            CacheEntry {
                profile: profile.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(profile)
    }

    pub fn invalidate(&self, user_id: Id<UserMarker>) {
        self.entries.remove(&user_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
