//! Application state shared by HTTP and WebSocket handlers.
//!
//! Handlers never touch screens directly: everything goes through the
//! `SessionHandle`, which queues events onto the single session loop.

use crate::session::SessionHandle;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
}

impl AppState {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}
