pub mod directory;
pub mod runtime;

pub use directory::DiscordDirectory;
pub use runtime::DiscordRuntime;
