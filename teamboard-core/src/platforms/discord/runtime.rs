use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    MessageSender,
    Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::outgoing::update_presence::UpdatePresencePayload;
use twilight_model::gateway::presence::{Activity, ActivityType, MinimalActivity, Status};

use crate::Error;
use crate::platforms::discord::directory::DiscordDirectory;
use crate::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};

/// Custom status the bot shows while it is tracking the roster.
pub const BOT_STATUS_TEXT: &str = "System Status";

fn bot_presence() -> Result<UpdatePresencePayload, Error> {
    let mut activity = Activity::from(MinimalActivity {
        kind: ActivityType::Custom,
        name: BOT_STATUS_TEXT.to_string(),
        url: None,
    });
    activity.state = Some(BOT_STATUS_TEXT.to_string());

    UpdatePresencePayload::new(vec![activity], false, None, Status::Online)
        .map_err(|e| Error::Platform(format!("invalid bot presence: {e}")))
}

/// Drives one shard:
///   - feeds every event into the in-memory cache
///   - flips `ready` once the session is established
async fn shard_runner(
    mut shard: Shard,
    cache: Arc<DefaultInMemoryCache>,
    ready: watch::Sender<bool>,
) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(event) => {
                cache.update(&event);

                match &event {
                    Event::Ready(data) => {
                        info!(
                            "Shard {shard_id} => READY as {} (ID={}, {} guilds)",
                            data.user.name,
                            data.user.id,
                            data.guilds.len()
                        );
                        ready.send_replace(true);
                    }
                    Event::GatewayClose(frame) => {
                        warn!("Shard {shard_id} => gateway closed: {frame:?}");
                    }
                    _ => {
                        trace!("Shard {shard_id} => event {:?}", event.kind());
                    }
                }
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// Gateway connection plus the REST client and cache built on top of it.
pub struct DiscordRuntime {
    token: String,
    connection_status: ConnectionStatus,

    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,

    http: Option<Arc<HttpClient>>,
    cache: Option<Arc<DefaultInMemoryCache>>,

    ready_tx: watch::Sender<bool>,
}

impl DiscordRuntime {
    pub fn new(token: String) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
            cache: None,
            ready_tx,
        }
    }

    /// Turns `true` once a shard has received READY.
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    /// Available after a successful [`PlatformIntegration::connect`].
    pub fn directory(&self) -> Option<DiscordDirectory> {
        match (&self.http, &self.cache) {
            (Some(http), Some(cache)) => Some(DiscordDirectory::new(http.clone(), cache.clone())),
            _ => None,
        }
    }
}

#[async_trait]
impl PlatformAuth for DiscordRuntime {
    async fn authenticate(&mut self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(())
    }

    async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(!self.token.is_empty())
    }
}

#[async_trait]
impl PlatformIntegration for DiscordRuntime {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordRuntime) Already connected => skipping");
            return Ok(());
        }
        self.authenticate().await?;

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build()
        );
        self.http = Some(http_client.clone());

        let cache = Arc::new(
            DefaultInMemoryCache::builder()
                .resource_types(
                    ResourceType::GUILD
                        | ResourceType::MEMBER
                        | ResourceType::PRESENCE
                        | ResourceType::USER,
                )
                .build(),
        );
        self.cache = Some(cache.clone());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MEMBERS | Intents::GUILD_PRESENCES,
        );
        let presence = bot_presence()?;

        let shards = gateway::create_recommended(&http_client, config, |_, builder| {
            builder.presence(presence.clone()).build()
        })
        .await
        .map_err(|e| {
            self.connection_status = ConnectionStatus::Error(e.to_string());
            Error::Platform(format!("create_recommended error: {e}"))
        })?;

        for shard in shards {
            self.shard_senders.push(shard.sender());

            let cache_for_shard = cache.clone();
            let ready_for_shard = self.ready_tx.clone();
            let handle = tokio::spawn(async move {
                shard_runner(shard, cache_for_shard, ready_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        self.connection_status = ConnectionStatus::Connected;
        info!("(DiscordRuntime) {} shard(s) started", self.shard_tasks.len());
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();
        self.ready_tx.send_replace(false);

        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_token_never_connects() {
        let mut runtime = DiscordRuntime::new(String::new());
        assert!(!runtime.is_authenticated().await.unwrap());

        let err = runtime.connect().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(runtime.get_connection_status().await.unwrap(), ConnectionStatus::Disconnected);
        assert!(runtime.directory().is_none());
        assert!(!*runtime.ready().borrow());
    }

    #[test]
    fn bot_presence_is_online_custom_status() {
        let payload = bot_presence().unwrap();
        assert_eq!(payload.status, Status::Online);
        assert_eq!(payload.activities.len(), 1);
        assert_eq!(payload.activities[0].kind, ActivityType::Custom);
        assert_eq!(payload.activities[0].name, BOT_STATUS_TEXT);
    }
}
