use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use teamboard_core::Error;
use teamboard_core::cache::ProfileCache;
use teamboard_core::config::{DashboardConfig, DEFAULT_PORT};
use teamboard_core::eventbus::BroadcastHub;
use teamboard_core::http::{router, serve};
use teamboard_core::platforms::PlatformIntegration;
use teamboard_core::platforms::discord::DiscordRuntime;
use teamboard_core::roster::{builtin_bio_overrides, Roster};
use teamboard_core::services::{PresenceResolver, ProfileNormalizer, RosterRefresher};
use teamboard_core::tasks::spawn_roster_refresh_task;

#[derive(Parser, Debug, Clone)]
#[command(name = "teamboard")]
#[command(author, version, about = "Teamboard - live Discord status board for a fixed roster")]
struct Args {
    /// Bot token used for REST and gateway access.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    /// HTTP listen port.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Guild checked first (with a soft member fetch) for presence.
    #[arg(long, env = "GUILD_ID")]
    guild_id: Option<u64>,

    /// Directory containing index.html and public/.
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    static_dir: PathBuf,

    /// Seconds between refresh cycles.
    #[arg(long, default_value_t = 10)]
    refresh_secs: u64,

    /// Upper bound in seconds for resolving one account.
    #[arg(long, default_value_t = 15)]
    fetch_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> Result<DashboardConfig, Error> {
        let config = DashboardConfig {
            bind_addr: self.bind,
            port: self.port,
            static_dir: self.static_dir,
            refresh_interval: Duration::from_secs(self.refresh_secs.max(1)),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs.max(1)),
            ..DashboardConfig::default()
        };
        config
            .with_token(self.discord_token)
            .with_primary_guild(self.guild_id)
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("teamboard=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Teamboard starting. port={}, guild={:?}", args.port, args.guild_id);

    if let Err(e) = run(args).await {
        error!("A fatal error occurred during startup: {e}");
        std::process::exit(1);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let config = args.into_config()?;
    let hub = BroadcastHub::new();
    let shutdown = CancellationToken::new();

    // 1) HTTP surface: always up, with or without a token.
    let handle = axum_server::Handle::new();
    let app = router(hub.clone(), &config.static_dir);
    let mut server = tokio::spawn(serve(app, config.socket_addr(), handle.clone()));

    // 2) Gateway + refresh loop, only when we can authenticate.
    let mut runtime = match config.discord_token.clone() {
        None => {
            warn!("DISCORD_TOKEN is missing. Roster refresh will not run, but the web server will start.");
            None
        }
        Some(token) => {
            let mut runtime = DiscordRuntime::new(token);
            match runtime.connect().await {
                Ok(()) => {
                    start_refresh(&runtime, &config, hub.clone(), shutdown.clone());
                    Some(runtime)
                }
                Err(e) => {
                    error!("Discord connection failed, roster refresh disabled: {e}");
                    None
                }
            }
        }
    };

    // 3) Run until Ctrl-C or the server dies.
    let server_result = tokio::select! {
        joined = &mut server => Some(joined),
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down.");
            None
        }
    };

    shutdown.cancel();
    if let Some(runtime) = runtime.as_mut() {
        if let Err(e) = runtime.disconnect().await {
            warn!("Discord disconnect failed: {e}");
        }
    }

    match server_result {
        Some(joined) => joined.map_err(|e| Error::Platform(format!("server task failed: {e}")))?,
        None => {
            handle.graceful_shutdown(Some(Duration::from_secs(5)));
            server
                .await
                .map_err(|e| Error::Platform(format!("server task failed: {e}")))?
        }
    }
}

fn start_refresh(
    runtime: &DiscordRuntime,
    config: &DashboardConfig,
    hub: BroadcastHub,
    shutdown: CancellationToken,
) {
    let Some(directory) = runtime.directory() else {
        warn!("Discord directory unavailable, roster refresh disabled.");
        return;
    };
    let directory = Arc::new(directory);

    let cache = Arc::new(ProfileCache::new(directory.clone()));
    let resolver = Arc::new(PresenceResolver::new(directory, config.primary_guild));
    let normalizer = Arc::new(ProfileNormalizer::new(builtin_bio_overrides()));
    let refresher = RosterRefresher::new(cache, resolver, normalizer, hub, Roster::builtin())
        .with_fetch_timeout(config.fetch_timeout);

    spawn_roster_refresh_task(
        Arc::new(refresher),
        config.refresh_interval,
        runtime.ready(),
        shutdown,
    );
}
