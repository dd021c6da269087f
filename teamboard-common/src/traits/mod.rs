pub mod discord_traits;

pub use discord_traits::{GuildDirectory, ProfileApi};
