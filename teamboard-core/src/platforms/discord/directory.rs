use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::Client as HttpClient;
use twilight_http::api_error::ApiError;
use twilight_http::error::ErrorType;
use twilight_model::gateway::presence::{Activity, Status};
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

use teamboard_common::models::{LiveMember, PresenceStatus, RawActivity, StaticProfile};
use teamboard_common::traits::{GuildDirectory, ProfileApi};
use crate::Error;

/// Discord API error code for "Unknown User".
pub const UNKNOWN_USER: u64 = 10013;
/// Discord API error code for "Unknown Member".
pub const UNKNOWN_MEMBER: u64 = 10007;

/// Extracts the JSON error code from a Discord error response, if any.
pub fn api_error_code(error: &twilight_http::Error) -> Option<u64> {
    match error.kind() {
        ErrorType::Response {
            error: ApiError::General(general),
            ..
        } => Some(general.code),
        _ => None,
    }
}

pub fn map_status(status: Status) -> PresenceStatus {
    match status {
        Status::Online => PresenceStatus::Online,
        Status::Idle => PresenceStatus::Idle,
        Status::DoNotDisturb => PresenceStatus::Dnd,
        // invisible and anything unknown render as offline
        _ => PresenceStatus::Offline,
    }
}

pub fn map_activity(activity: &Activity) -> RawActivity {
    RawActivity {
        name: activity.name.clone(),
        kind: u8::from(activity.kind),
        details: activity.details.clone(),
        state: activity.state.clone(),
    }
}

/// [`ProfileApi`] and [`GuildDirectory`] over the twilight REST client and
/// the gateway-fed in-memory cache.
#[derive(Clone)]
pub struct DiscordDirectory {
    http: Arc<HttpClient>,
    cache: Arc<DefaultInMemoryCache>,
}

impl DiscordDirectory {
    pub fn new(http: Arc<HttpClient>, cache: Arc<DefaultInMemoryCache>) -> Self {
        Self { http, cache }
    }

    fn cached_presence(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> Option<LiveMember> {
        self.cache.presence(guild_id, user_id).map(|presence| {
            LiveMember::new(
                map_status(presence.status()),
                presence.activities().iter().map(map_activity).collect(),
            )
        })
    }
}

#[async_trait]
impl ProfileApi for DiscordDirectory {
    async fn fetch_profile(&self, user_id: Id<UserMarker>) -> Result<StaticProfile, Error> {
        let response = self.http.user(user_id).await.map_err(|e| {
            if api_error_code(&e) == Some(UNKNOWN_USER) {
                Error::UnknownAccount(user_id.to_string())
            } else {
                Error::Http(e)
            }
        })?;

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Platform(format!("reading user {user_id} body: {e}")))?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl GuildDirectory for DiscordDirectory {
    fn knows_guild(&self, guild_id: Id<GuildMarker>) -> bool {
        self.cache.guild(guild_id).is_some()
    }

    fn guild_ids(&self) -> Vec<Id<GuildMarker>> {
        self.cache.iter().guilds().map(|guild| *guild.key()).collect()
    }

    fn cached_member(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> Option<LiveMember> {
        if let Some(live) = self.cached_presence(guild_id, user_id) {
            return Some(live);
        }
        // a cached member without a cached presence is offline
        self.cache
            .member(guild_id, user_id)
            .map(|_| LiveMember::default())
    }

    async fn fetch_member(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> Result<Option<LiveMember>, Error> {
        match self.http.guild_member(guild_id, user_id).await {
            Ok(_) => {
                trace!("(DiscordDirectory) fetched member {user_id} of {guild_id}");
                Ok(Some(self.cached_presence(guild_id, user_id).unwrap_or_default()))
            }
            Err(e) if matches!(api_error_code(&e), Some(UNKNOWN_MEMBER | UNKNOWN_USER)) => Ok(None),
            Err(e) => Err(Error::Http(e)),
        }
    }
}
