//! Zero-G Lesson · microgravity lesson, quiz and chat backend
//!
//! - Axum HTTP + WebSocket API driving a single lesson session
//! - Five screens (Welcome, Lesson, Quiz, Result, Chat) behind one navigation controller
//! - Chat answers from a small knowledge base, else from an encyclopedic summary service
//! - Browser client served from its own directory; only well-known images from the asset directory
//!
//! Configuration comes from `zerog.toml` in the working directory (all optional):
//!   [server]     bind
//!   [log]        level, format
//!   [summary]    base_url, user_agent, timeout_secs
//!   [progress]   path, lesson_name
//!   [assets]     dir, client_dir
//!   [animation]  interval_ms, width, height
//! plus content overrides: dialogue, [lesson], [[questions]], [[knowledge]].

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod seeds;
mod knowledge;
mod quiz;
mod chat;
mod summary;
mod progress;
mod background;
mod assets;
mod screens;
mod controller;
mod session;
mod state;
mod protocol;
mod routes;

use std::{path::Path, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::Notify};
use tracing::{error, info};

use crate::assets::Assets;
use crate::config::{load_config, SummaryCfg, CONFIG_PATH};
use crate::controller::Controller;
use crate::routes::build_router;
use crate::session::{spawn_session, SessionConfig};
use crate::state::AppState;
use crate::summary::WikiSummary;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let cfg = tracing::subscriber::with_default(telemetry::bootstrap_subscriber(), || load_config(CONFIG_PATH));
  telemetry::init_tracing(&cfg.log);

  let assets = Assets::discover(&cfg.assets.dir);
  let controller = Controller::new(&cfg, assets.clone());

  let provider = match WikiSummary::new(&cfg.summary) {
    Ok(p) => p,
    Err(e) => {
      error!(target: "zerog_lesson", error = %e, base_url = %cfg.summary.base_url, "Invalid summary service settings; using defaults");
      WikiSummary::new(&SummaryCfg::default())?
    }
  };
  info!(target: "zerog_lesson", base_url = %provider.base_url, "Summary service configured");

  let tick = (cfg.animation.interval_ms > 0).then(|| Duration::from_millis(cfg.animation.interval_ms));
  let shutdown = Arc::new(Notify::new());
  let (session, session_task) = spawn_session(
    controller,
    Arc::new(provider),
    SessionConfig { tick, lesson_name: cfg.progress.lesson_name.clone() },
    shutdown.clone(),
  );

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(AppState::new(session), &assets, Path::new(&cfg.assets.client_dir));

  let listener = TcpListener::bind(cfg.server.bind.as_str()).await?;
  info!(target: "zerog_lesson", addr = %listener.local_addr()?, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal(shutdown))
    .await?;

  session_task.abort();
  info!(target: "zerog_lesson", "Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C or when the learner presses Exit.
async fn shutdown_signal(exit: Arc<Notify>) {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!(target: "zerog_lesson", error = %e, "Failed to listen for Ctrl-C; only Exit will stop the server");
      std::future::pending::<()>().await;
    }
  };
  tokio::select! {
    _ = ctrl_c => info!(target: "zerog_lesson", "Ctrl-C received; shutting down"),
    _ = exit.notified() => info!(target: "zerog_lesson", "Learner exited; shutting down"),
  }
}
