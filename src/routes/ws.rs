//! WebSocket upgrade + message loop. Client messages are parsed as JSON and
//! queued onto the session loop; every render the loop broadcasts is relayed
//! back to the socket.

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  http::{header, HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, instrument, warn};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::screens::UiAction;
use crate::session::{SessionEvent, SessionHandle};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip_all)]
pub async fn ws_upgrade(ws: WebSocketUpgrade, headers: HeaderMap, State(state): State<AppState>) -> Response {
  if !same_origin(&headers) {
    warn!(target: "zerog_lesson", origin = ?headers.get(header::ORIGIN), "Rejecting cross-origin WebSocket");
    return StatusCode::FORBIDDEN.into_response();
  }
  info!(target: "zerog_lesson", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Browsers always send `Origin`; it must name the host serving the client.
/// Requests without one come from non-browser tools and are let through.
fn same_origin(headers: &HeaderMap) -> bool {
  let Some(origin) = headers.get(header::ORIGIN) else { return true };
  let (Ok(origin), Some(Ok(host))) = (origin.to_str(), headers.get(header::HOST).map(|h| h.to_str())) else {
    return false;
  };
  let authority = origin
    .strip_prefix("http://")
    .or_else(|| origin.strip_prefix("https://"))
    .unwrap_or("");
  authority.eq_ignore_ascii_case(host)
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: AppState) {
  info!(target: "zerog_lesson", "WebSocket connected");
  let mut updates = state.session.subscribe();

  loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => {
                debug!(target: "zerog_lesson", kind = message_kind(&incoming), "WS received");
                handle_client_ws(incoming, &state.session).await
              }
              Err(e) => {
                warn!(target: "zerog_lesson", payload = %trunc_for_log(&txt, 120), error = %e, "Invalid WS message");
                Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) })
              }
            };
            if let Some(reply) = reply {
              if !send_json(&mut socket, &reply).await {
                break;
              }
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      update = updates.recv() => {
        let Some(msg) = relay(update, &state.session).await else { break };
        let goodbye = matches!(msg, ServerWsMessage::Goodbye);
        if !send_json(&mut socket, &msg).await || goodbye {
          break;
        }
      }
    }
  }
  info!(target: "zerog_lesson", "WebSocket disconnected");
}

/// What to forward for one broadcast receive; `None` ends the socket loop.
async fn relay(update: Result<ServerWsMessage, RecvError>, session: &SessionHandle) -> Option<ServerWsMessage> {
  match update {
    Ok(msg) => Some(msg),
    Err(RecvError::Lagged(skipped)) => {
      // skipped messages may include screen renders; resync with a fresh one
      debug!(target: "zerog_lesson", skipped, "WS client lagging behind broadcasts; resending screen");
      session.render().await
    }
    Err(RecvError::Closed) => None,
  }
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  if let Err(e) = socket.send(Message::Text(out)).await {
    error!(target: "zerog_lesson", error = %e, "WS send error");
    return false;
  }
  true
}

fn message_kind(msg: &ClientWsMessage) -> &'static str {
  match msg {
    ClientWsMessage::Ping => "ping",
    ClientWsMessage::Join => "join",
    ClientWsMessage::Next => "next",
    ClientWsMessage::Back => "back",
    ClientWsMessage::TakeQuiz => "take_quiz",
    ClientWsMessage::OpenChat => "open_chat",
    ClientWsMessage::Select { .. } => "select",
    ClientWsMessage::Ask { .. } => "ask",
    ClientWsMessage::Exit => "exit",
    ClientWsMessage::Resize { .. } => "resize",
    ClientWsMessage::SaveProgress { .. } => "save_progress",
  }
}

enum Routed {
  Event(SessionEvent),
  Reply(ServerWsMessage),
  Join,
}

/// Map a client message to a session event. UI actions answer through the
/// broadcast channel, so only direct replies come back here.
fn route(msg: ClientWsMessage) -> Routed {
  let action = match msg {
    ClientWsMessage::Ping => return Routed::Reply(ServerWsMessage::Pong),
    ClientWsMessage::Join => return Routed::Join,
    ClientWsMessage::Next => UiAction::Next,
    ClientWsMessage::Back => UiAction::Back,
    ClientWsMessage::TakeQuiz => UiAction::TakeQuiz,
    ClientWsMessage::OpenChat => UiAction::OpenChat,
    // negative indices are out of range like any other
    ClientWsMessage::Select { index } => UiAction::Select(usize::try_from(index).unwrap_or(usize::MAX)),
    ClientWsMessage::Ask { text } => {
      debug!(target: "chat", text_len = text.len(), "WS chat submission");
      UiAction::Ask(text)
    }
    ClientWsMessage::Exit => UiAction::Exit,
    ClientWsMessage::Resize { width, height } => return Routed::Event(SessionEvent::Resize { width, height }),
    ClientWsMessage::SaveProgress { lesson, score } => {
      return Routed::Event(SessionEvent::SaveProgress { lesson, score, reply: None })
    }
  };
  Routed::Event(SessionEvent::Ui(action))
}

async fn handle_client_ws(msg: ClientWsMessage, session: &SessionHandle) -> Option<ServerWsMessage> {
  let ended = || ServerWsMessage::Error { message: "Session has ended.".into() };
  match route(msg) {
    Routed::Reply(reply) => Some(reply),
    Routed::Join => Some(session.render().await.unwrap_or_else(ended)),
    Routed::Event(event) => {
      if session.send(event).await {
        None
      } else {
        Some(ended())
      }
    }
  }
}
