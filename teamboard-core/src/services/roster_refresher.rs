use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use teamboard_common::models::{AccountRecord, Snapshot};
use crate::cache::ProfileCache;
use crate::eventbus::BroadcastHub;
use crate::roster::Roster;
use crate::services::presence_resolver::PresenceResolver;
use crate::services::profile_normalizer::ProfileNormalizer;
use crate::Error;

/// Pause between the end of one cycle's publish and the start of the next.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Upper bound for resolving a single account (profile + presence).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Drives the refresh cycle: roster → cache + resolver → normalizer → hub.
pub struct RosterRefresher {
    cache: Arc<ProfileCache>,
    resolver: Arc<PresenceResolver>,
    normalizer: Arc<ProfileNormalizer>,
    hub: BroadcastHub,
    roster: Roster,
    fetch_timeout: Duration,
}

impl RosterRefresher {
    pub fn new(
        cache: Arc<ProfileCache>,
        resolver: Arc<PresenceResolver>,
        normalizer: Arc<ProfileNormalizer>,
        hub: BroadcastHub,
        roster: Roster,
    ) -> Self {
        Self {
            cache,
            resolver,
            normalizer,
            hub,
            roster,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Runs one full cycle and publishes the result. Never fails: every
    /// account that cannot be resolved is published as a fallback record.
    pub async fn refresh_once(&self) -> Snapshot {
        let team = self.fetch_list(&self.roster.team).await;
        let bots = self.fetch_list(&self.roster.bots).await;

        let snapshot = Snapshot {
            team,
            bots,
            last_update: Utc::now().timestamp_millis(),
        };
        self.hub.publish(snapshot.clone());
        snapshot
    }

    /// Repeats [`Self::refresh_once`] until `shutdown` fires. The next cycle
    /// only starts `interval` after the previous publish finished.
    pub async fn run(&self, interval: Duration, shutdown: CancellationToken) {
        info!(
            "(RosterRefresher) started: {} team, {} bots, every {:?}",
            self.roster.team.len(),
            self.roster.bots.len(),
            interval
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                snapshot = self.refresh_once() => {
                    debug!(
                        "(RosterRefresher) published {} team / {} bots",
                        snapshot.team.len(),
                        snapshot.bots.len()
                    );
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(interval) => {}
            }
        }

        info!("(RosterRefresher) stopped.");
    }

    async fn fetch_list(&self, ids: &[Id<UserMarker>]) -> Vec<AccountRecord> {
        join_all(ids.iter().map(|&user_id| self.fetch_account(user_id))).await
    }

    /// Resolves one account, containing every failure to this account.
    pub async fn fetch_account(&self, user_id: Id<UserMarker>) -> AccountRecord {
        match timeout(self.fetch_timeout, self.resolve_account(user_id)).await {
            Ok(Ok(record)) => record,
            Ok(Err(Error::UnknownAccount(_))) => {
                debug!("(RosterRefresher) {user_id} is an unknown account");
                ProfileNormalizer::fallback(user_id)
            }
            Ok(Err(e)) => {
                warn!("(RosterRefresher) Warning fetching {user_id}: {e}");
                ProfileNormalizer::fallback(user_id)
            }
            Err(elapsed) => {
                warn!("(RosterRefresher) Fetching {user_id} timed out: {elapsed}");
                ProfileNormalizer::fallback(user_id)
            }
        }
    }

    async fn resolve_account(&self, user_id: Id<UserMarker>) -> Result<AccountRecord, Error> {
        let profile = self.cache.get(user_id).await?;
        let member = self.resolver.resolve(user_id).await;
        Ok(self.normalizer.normalize(&profile, member.as_ref()))
    }
}
