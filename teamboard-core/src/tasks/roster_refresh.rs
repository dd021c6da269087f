// teamboard-core/src/tasks/roster_refresh.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::services::RosterRefresher;

/// Spawns the periodic roster refresh. The loop waits until `ready` turns
/// `true` (gateway authenticated and cache primed) and never starts if the
/// sender goes away first.
pub fn spawn_roster_refresh_task(
    refresher: Arc<RosterRefresher>,
    interval: Duration,
    mut ready: watch::Receiver<bool>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let became_ready = tokio::select! {
            _ = shutdown.cancelled() => false,
            result = ready.wait_for(|ready| *ready) => result.is_ok(),
        };

        if !became_ready {
            warn!("(RosterRefresh) gateway never became ready, roster refresh not started");
            return;
        }

        info!("(RosterRefresh) gateway ready, starting refresh loop");
        refresher.run(interval, shutdown).await;
    })
}
