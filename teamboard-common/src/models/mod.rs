// File: teamboard-common/src/models/mod.rs
pub mod account;
pub mod profile;
pub mod snapshot;

pub use account::{AccountRecord, Activity, ActivityLabel, PresenceStatus};
pub use profile::{AvatarDecoration, LiveMember, RawActivity, StaticProfile};
pub use snapshot::Snapshot;
