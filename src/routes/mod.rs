//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::assets::{Assets, ASSET_ROUTE};
use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - The well-known images found at startup under `/assets/<name>` (nothing else
///   from the asset directory is reachable)
/// - The browser client from `client_dir` as the fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: AppState, assets: &Assets, client_dir: &Path) -> Router {
    let client = ServeDir::new(client_dir).append_index_html_on_directories(true);

    let mut router = Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/session", get(http::http_get_session))
        .route("/api/v1/progress", post(http::http_post_progress));

    for name in assets.present() {
        router = router.route_service(&format!("{}/{}", ASSET_ROUTE, name), ServeFile::new(assets.dir().join(name)));
    }
    info!(target: "zerog_lesson", images = assets.present().count(), client_dir = %client_dir.display(), "Static routes mounted");

    router
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(client)
}
