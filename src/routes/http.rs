//! HTTP endpoint handlers. Thin wrappers that queue work onto the session loop.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument, warn};

use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(State(state): State<AppState>) -> Result<Json<SessionOut>, StatusCode> {
  match state.session.snapshot().await {
    Some(snap) => {
      info!(target: "zerog_lesson", screen = %snap.screen, score = snap.score, "HTTP session snapshot served");
      Ok(Json(snap))
    }
    None => {
      warn!(target: "zerog_lesson", "Session loop is gone; snapshot unavailable");
      Err(StatusCode::SERVICE_UNAVAILABLE)
    }
  }
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_progress(
  State(state): State<AppState>,
  body: Option<Json<ProgressIn>>,
) -> impl IntoResponse {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let ok = state.session.save_progress(body.lesson, body.score).await;
  info!(target: "zerog_lesson", %ok, "HTTP progress append finished");
  Json(ProgressOut { ok })
}
