//! HTTP surface for the dashboard.
//!
//! - `GET /api/status`: the current snapshot as JSON
//! - `GET /api/stream`: Server-Sent Events, one `data:` frame per snapshot
//! - `GET /`, `/index.html`, `/public/*`: static assets from the configured directory
//!
//! Everything else is a plain-text 404.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, sse::{Event, Sse}},
    routing::get,
};
use axum_server::Handle;
use tokio_stream::StreamExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::Error;
use crate::eventbus::BroadcastHub;

/// Headers every API response carries.
const CORS_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

/// Shared state for the Axum routes.
#[derive(Clone)]
pub struct AppState {
    pub hub: BroadcastHub,
}

pub fn router(hub: BroadcastHub, static_dir: &Path) -> Router {
    let index = static_dir.join("index.html");

    Router::new()
        .route("/api/status", get(handle_status))
        .route("/api/stream", get(handle_stream))
        .route_service("/", ServeFile::new(&index))
        .route_service("/index.html", ServeFile::new(&index))
        .nest_service("/public", ServeDir::new(static_dir.join("public")))
        .fallback(handle_not_found)
        .with_state(AppState { hub })
        .layer(TraceLayer::new_for_http())
}

/// Serves `app` on `addr` until `handle` is told to shut down.
pub async fn serve(app: Router, addr: SocketAddr, handle: Handle) -> Result<(), Error> {
    info!("Dashboard running at http://{addr}");
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    info!("Dashboard server shut down.");
    Ok(())
}

async fn handle_status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.hub.current_snapshot();
    (CORS_HEADERS, Json(snapshot.as_ref().clone()))
}

async fn handle_stream(State(state): State<AppState>) -> impl IntoResponse {
    let stream = state
        .hub
        .subscribe()
        .map(|payload| Ok::<_, Infallible>(Event::default().data(&*payload)));

    (
        CORS_HEADERS,
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(stream),
    )
}

async fn handle_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
