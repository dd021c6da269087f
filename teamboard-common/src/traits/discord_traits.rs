use async_trait::async_trait;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

use crate::error::Error;
use crate::models::{LiveMember, StaticProfile};

/// Rate-limited static profile lookups.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Fetches the account's static profile from the platform.
    ///
    /// Must return [`Error::UnknownAccount`] when the platform reports the
    /// account does not exist.
    async fn fetch_profile(&self, user_id: Id<UserMarker>) -> Result<StaticProfile, Error>;
}

/// Guild membership and presence as visible to the bot.
///
/// Everything except [`GuildDirectory::fetch_member`] reads local gateway
/// state only and never touches the network.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    fn knows_guild(&self, guild_id: Id<GuildMarker>) -> bool;

    /// Every guild the bot is currently a member of.
    fn guild_ids(&self) -> Vec<Id<GuildMarker>>;

    fn cached_member(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> Option<LiveMember>;

    /// Non-forcing member lookup. `Ok(None)` means the account is not in the guild.
    async fn fetch_member(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> Result<Option<LiveMember>, Error>;
}
