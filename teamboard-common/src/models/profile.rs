// File: teamboard-common/src/models/profile.rs

use serde::{Deserialize, Serialize};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use crate::models::account::PresenceStatus;

/// Raw user object as returned by `GET /users/{id}`.
///
/// Deserialized from the response body directly so that fields the typed
/// twilight `User` model does not carry (notably `bio`) are kept.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StaticProfile {
    pub id: Id<UserMarker>,
    pub username: String,
    pub global_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub accent_color: Option<u32>,
    pub avatar_decoration_data: Option<AvatarDecoration>,
}

impl StaticProfile {
    /// Bare profile with only the identity fields set.
    pub fn new(id: Id<UserMarker>, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            global_name: None,
            bio: None,
            avatar: None,
            banner: None,
            accent_color: None,
            avatar_decoration_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AvatarDecoration {
    pub asset: String,
}

/// An activity as seen in the gateway presence cache, before label mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawActivity {
    pub name: String,
    /// Platform activity type index (4 = custom status).
    pub kind: u8,
    pub details: Option<String>,
    pub state: Option<String>,
}

impl RawActivity {
    pub fn new(name: impl Into<String>, kind: u8) -> Self {
        Self {
            name: name.into(),
            kind,
            details: None,
            state: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// Live presence for a member of some guild the bot shares with the account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveMember {
    pub status: PresenceStatus,
    pub activities: Vec<RawActivity>,
}

impl LiveMember {
    pub fn new(status: PresenceStatus, activities: Vec<RawActivity>) -> Self {
        Self { status, activities }
    }
}
