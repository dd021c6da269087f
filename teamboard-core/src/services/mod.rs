pub mod presence_resolver;
pub mod profile_normalizer;
pub mod roster_refresher;

pub use presence_resolver::PresenceResolver;
pub use profile_normalizer::ProfileNormalizer;
pub use roster_refresher::{RosterRefresher, DEFAULT_FETCH_TIMEOUT, REFRESH_INTERVAL};
