use std::sync::Arc;

use tracing::trace;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

use teamboard_common::models::LiveMember;
use teamboard_common::traits::GuildDirectory;

/// Finds live presence for an account.
///
/// Presence is only visible through guilds the bot shares with the account.
/// The primary guild may spend one soft member fetch; every other guild is
/// checked from the gateway cache only so lookups never burn REST quota.
pub struct PresenceResolver {
    directory: Arc<dyn GuildDirectory>,
    primary_guild: Option<Id<GuildMarker>>,
}

impl PresenceResolver {
    pub fn new(directory: Arc<dyn GuildDirectory>, primary_guild: Option<Id<GuildMarker>>) -> Self {
        Self {
            directory,
            primary_guild,
        }
    }

    /// First match wins: primary guild (cache, then soft fetch), then any
    /// shared guild from cache, then `None`. Lookup errors are swallowed.
    pub async fn resolve(&self, user_id: Id<UserMarker>) -> Option<LiveMember> {
        if let Some(member) = self.resolve_in_primary(user_id).await {
            return Some(member);
        }

        self.directory
            .guild_ids()
            .into_iter()
            .find_map(|guild_id| self.directory.cached_member(guild_id, user_id))
    }

    async fn resolve_in_primary(&self, user_id: Id<UserMarker>) -> Option<LiveMember> {
        let guild_id = self.primary_guild?;
        if !self.directory.knows_guild(guild_id) {
            trace!("(PresenceResolver) primary guild {guild_id} not in cache");
            return None;
        }

        if let Some(member) = self.directory.cached_member(guild_id, user_id) {
            return Some(member);
        }

        match self.directory.fetch_member(guild_id, user_id).await {
            Ok(member) => member,
            Err(e) => {
                trace!("(PresenceResolver) soft fetch of {user_id} in {guild_id} failed: {e}");
                None
            }
        }
    }
}
