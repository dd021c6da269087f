use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

use crate::services::roster_refresher::{DEFAULT_FETCH_TIMEOUT, REFRESH_INTERVAL};
use crate::Error;

pub const DEFAULT_PORT: u16 = 8080;

/// Runtime settings. The roster itself is compiled in (see [`crate::roster`]).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Bot token. Without one only the HTTP surface runs.
    pub discord_token: Option<String>,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub primary_guild: Option<Id<GuildMarker>>,
    /// Directory holding `index.html` and `public/`.
    pub static_dir: PathBuf,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            discord_token: None,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            primary_guild: None,
            static_dir: PathBuf::from("."),
            refresh_interval: REFRESH_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl DashboardConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Blank tokens count as missing.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.discord_token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_primary_guild(mut self, guild_id: Option<u64>) -> Result<Self, Error> {
        self.primary_guild = match guild_id {
            Some(raw) => Some(
                Id::new_checked(raw)
                    .ok_or_else(|| Error::Config(format!("invalid guild id: {raw}")))?,
            ),
            None => None,
        };
        Ok(self)
    }

    pub fn has_token(&self) -> bool {
        self.discord_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = DashboardConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert!(!config.has_token());
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let config = DashboardConfig::default().with_token(Some("   ".into()));
        assert!(!config.has_token());
        let config = DashboardConfig::default().with_token(Some(" abc ".into()));
        assert_eq!(config.discord_token.as_deref(), Some("abc"));
    }

    #[test]
    fn zero_guild_id_is_rejected() {
        assert!(DashboardConfig::default().with_primary_guild(Some(0)).is_err());
        let config = DashboardConfig::default()
            .with_primary_guild(Some(1234))
            .unwrap();
        assert_eq!(config.primary_guild, Some(Id::new(1234)));
    }
}
