// File: teamboard-common/src/models/account.rs

use std::fmt;
use serde::{Deserialize, Serialize};

/// Presence status as published to clients.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceStatus::Online => write!(f, "online"),
            PresenceStatus::Idle => write!(f, "idle"),
            PresenceStatus::Dnd => write!(f, "dnd"),
            PresenceStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Display label for an activity, indexed by the platform's activity type.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ActivityLabel {
    Playing,
    Streaming,
    Listening,
    Watching,
    Custom,
    Competing,
    /// Any type index outside the known table.
    #[serde(rename = "Activity")]
    Other,
}

impl ActivityLabel {
    pub const CUSTOM_INDEX: u8 = 4;

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => ActivityLabel::Playing,
            1 => ActivityLabel::Streaming,
            2 => ActivityLabel::Listening,
            3 => ActivityLabel::Watching,
            4 => ActivityLabel::Custom,
            5 => ActivityLabel::Competing,
            _ => ActivityLabel::Other,
        }
    }
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLabel::Playing => "Playing",
            ActivityLabel::Streaming => "Streaming",
            ActivityLabel::Listening => "Listening",
            ActivityLabel::Watching => "Watching",
            ActivityLabel::Custom => "Custom",
            ActivityLabel::Competing => "Competing",
            ActivityLabel::Other => "Activity",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityLabel,
    pub details: Option<String>,
    pub state: Option<String>,
}

/// One tracked account, normalized for the dashboard.
///
/// Optional fields serialize as `null`; `activities` holds at most one entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub banner_url: Option<String>,
    pub accent_color: Option<String>,
    pub decoration_url: Option<String>,
    pub status: PresenceStatus,
    pub status_text: Option<String>,
    pub activities: Vec<Activity>,
}
