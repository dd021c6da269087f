//! Turns a static profile plus optional live presence into the record the
//! dashboard renders.
//!
//! All CDN URL rules live here so the fallback record and the normal path
//! agree on the default avatar set.

use std::collections::HashMap;

use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use teamboard_common::models::{
    AccountRecord, Activity, ActivityLabel, LiveMember, PresenceStatus, RawActivity, StaticProfile,
};

pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Shown when neither an override nor the platform supplies a bio.
pub const DEFAULT_BIO: &str = "這個人很懶，什麼都沒寫。";

pub const FALLBACK_AVATAR: &str = "https://cdn.discordapp.com/embed/avatars/0.png";
pub const FALLBACK_USERNAME: &str = "Unknown User";
pub const FALLBACK_BIO: &str = "User not found.";

/// Number of built-in default avatars on the CDN.
pub const DEFAULT_AVATAR_VARIANTS: u64 = 6;

/// Activities shown ahead of anything else the account is doing.
pub const PRIORITY_ACTIVITIES: [&str; 2] = ["Visual Studio Code", "Spotify"];

fn image_extension(hash: &str) -> &'static str {
    if hash.starts_with("a_") { "gif" } else { "png" }
}

pub fn avatar_url(user_id: Id<UserMarker>, hash: &str) -> String {
    format!("{CDN_BASE}/avatars/{user_id}/{hash}.{}?size=1024", image_extension(hash))
}

pub fn banner_url(user_id: Id<UserMarker>, hash: &str) -> String {
    format!("{CDN_BASE}/banners/{user_id}/{hash}.{}?size=1024", image_extension(hash))
}

pub fn decoration_url(asset: &str) -> String {
    format!("{CDN_BASE}/avatar-decoration-presets/{asset}.png?size=1024")
}

/// Default avatar for accounts without a custom one: the snowflake's
/// timestamp bits (`id >> 22`) modulo the number of variants.
pub fn default_avatar_url(user_id: Id<UserMarker>) -> String {
    let index = (user_id.get() >> 22) % DEFAULT_AVATAR_VARIANTS;
    format!("{CDN_BASE}/embed/avatars/{index}.png")
}

pub fn format_accent_color(color: u32) -> String {
    format!("#{color:06x}")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Merges profile data, presence and local bio overrides.
#[derive(Debug, Clone, Default)]
pub struct ProfileNormalizer {
    bio_overrides: HashMap<Id<UserMarker>, String>,
}

impl ProfileNormalizer {
    pub fn new(bio_overrides: HashMap<Id<UserMarker>, String>) -> Self {
        Self { bio_overrides }
    }

    pub fn normalize(&self, profile: &StaticProfile, member: Option<&LiveMember>) -> AccountRecord {
        let activities: &[RawActivity] = member.map(|m| m.activities.as_slice()).unwrap_or_default();
        let status = member.map(|m| m.status).unwrap_or(PresenceStatus::Offline);

        let status_text = activities
            .iter()
            .find(|a| a.kind == ActivityLabel::CUSTOM_INDEX)
            .and_then(|a| a.state.clone());

        let avatar_url = match profile.avatar.as_deref() {
            Some(hash) => avatar_url(profile.id, hash),
            None => default_avatar_url(profile.id),
        };

        AccountRecord {
            id: profile.id.to_string(),
            username: profile.username.clone(),
            display_name: non_empty(profile.global_name.as_deref())
                .unwrap_or(&profile.username)
                .to_string(),
            bio: self.resolve_bio(profile),
            avatar_url,
            banner_url: profile.banner.as_deref().map(|hash| banner_url(profile.id, hash)),
            accent_color: profile.accent_color.map(format_accent_color),
            decoration_url: profile
                .avatar_decoration_data
                .as_ref()
                .map(|decoration| decoration_url(&decoration.asset)),
            status,
            status_text,
            activities: select_main_activity(activities).into_iter().collect(),
        }
    }

    /// Override, then API bio, then the placeholder. Whichever wins is
    /// trimmed, and a blank result falls back to the placeholder.
    pub fn resolve_bio(&self, profile: &StaticProfile) -> String {
        let chosen = non_empty(self.bio_overrides.get(&profile.id).map(String::as_str))
            .or_else(|| non_empty(profile.bio.as_deref()))
            .unwrap_or(DEFAULT_BIO)
            .trim();

        if chosen.is_empty() {
            DEFAULT_BIO.to_string()
        } else {
            chosen.to_string()
        }
    }

    /// Record published for an account whose profile could not be fetched.
    pub fn fallback(user_id: Id<UserMarker>) -> AccountRecord {
        let id = user_id.to_string();
        let prefix: String = id.chars().take(4).collect();
        AccountRecord {
            display_name: format!("ID: {prefix}..."),
            id,
            username: FALLBACK_USERNAME.to_string(),
            bio: FALLBACK_BIO.to_string(),
            avatar_url: FALLBACK_AVATAR.to_string(),
            banner_url: None,
            accent_color: None,
            decoration_url: None,
            status: PresenceStatus::Offline,
            status_text: None,
            activities: Vec::new(),
        }
    }
}

/// Priority allowlist first, then the first non-custom activity.
fn select_main_activity(activities: &[RawActivity]) -> Option<Activity> {
    let mut regular = activities.iter().filter(|a| a.kind != ActivityLabel::CUSTOM_INDEX);
    let chosen = regular
        .clone()
        .find(|a| PRIORITY_ACTIVITIES.contains(&a.name.as_str()))
        .or_else(|| regular.next())?;

    Some(Activity {
        name: chosen.name.clone(),
        kind: ActivityLabel::from_index(chosen.kind),
        details: chosen.details.clone(),
        state: chosen.state.clone(),
    })
}
