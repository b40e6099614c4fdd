use crate::signaling::{Relay, ws_handler};
use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::path::PathBuf;
use tokio::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    relay: Relay,
    started: Instant,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay,
            started: Instant::now(),
        }
    }
}

impl FromRef<AppState> for Relay {
    fn from_ref(state: &AppState) -> Self {
        state.relay.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// Seconds since the router was built.
    pub uptime: f64,
    pub rooms: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        uptime: state.started.elapsed().as_secs_f64(),
        rooms: state.relay.registry().room_count(),
    })
}

/// `/ws` signaling endpoint, `/health`, and optionally the static client under `/`.
pub fn router(relay: Relay, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors).with_state(AppState::new(relay))
}
