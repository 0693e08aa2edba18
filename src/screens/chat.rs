//! Chat screen: transcript plus the router. Summary lookups leave the loop as
//! effects; replies that come back after the learner has left are dropped.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{Nav, RenderCtx, Screen, UiAction};
use crate::assets::AVATAR_IMAGE;
use crate::chat::{Asked, ChatRouter, LookupTicket, PLACEHOLDER};
use crate::domain::ScreenName;
use crate::protocol::ScreenView;

pub struct ChatScreen {
  router: ChatRouter,
  /// Bumped every time the learner leaves; tickets from older visits are stale.
  visit: u64,
  visible: bool,
  pending: HashSet<u64>,
}

impl ChatScreen {
  pub fn new(router: ChatRouter) -> Self {
    Self { router, visit: 0, visible: false, pending: HashSet::new() }
  }

  pub fn router(&self) -> &ChatRouter { &self.router }

  /// Post a finished lookup back. Returns false when the reply was dropped.
  pub fn deliver(&mut self, ticket: &LookupTicket, reply: String) -> bool {
    if !self.visible || ticket.visit != self.visit || !self.pending.remove(&ticket.user_turn) {
      info!(target: "chat", user_turn = ticket.user_turn, "Dropping summary reply for a closed chat visit");
      return false;
    }
    self.router.complete(ticket, reply);
    true
  }
}

impl Screen for ChatScreen {
  fn name(&self) -> ScreenName { ScreenName::Chat }

  fn mount(&mut self, _nav: &mut Nav<'_>) {
    self.visible = true;
  }

  fn unmount(&mut self) {
    self.visible = false;
    self.visit += 1;
    if !self.pending.is_empty() {
      debug!(target: "chat", pending = self.pending.len(), "Leaving chat with lookups in flight");
      self.pending.clear();
    }
  }

  fn handle(&mut self, action: UiAction, nav: &mut Nav<'_>) -> bool {
    match action {
      UiAction::Back => {
        nav.show_screen(ScreenName::Lesson);
        true
      }
      UiAction::Ask(text) => match self.router.ask(&text, self.visit) {
        Asked::Ignored => false,
        Asked::Answered => true,
        Asked::Lookup(ticket) => {
          self.pending.insert(ticket.user_turn);
          nav.lookup(ticket);
          true
        }
      },
      _ => false,
    }
  }

  fn render(&self, ctx: &RenderCtx<'_>) -> ScreenView {
    ScreenView::Chat {
      transcript: self.router.transcript().to_vec(),
      placeholder: PLACEHOLDER.to_string(),
      pending: self.pending.len(),
      avatar: ctx.assets.url(AVATAR_IMAGE),
    }
  }
}
