pub mod roster_refresh;

pub use roster_refresh::spawn_roster_refresh_task;
