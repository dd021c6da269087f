pub mod profile_cache;

pub use profile_cache::{ProfileCache, PROFILE_TTL};
