// src/lib.rs

pub mod cache;
pub mod config;
pub mod eventbus;
pub mod http;
pub mod platforms;
pub mod roster;
pub mod services;
pub mod tasks;

pub use teamboard_common::error::Error;
pub use cache::ProfileCache;
pub use eventbus::BroadcastHub;
