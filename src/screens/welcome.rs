//! Welcome screen: paces the Mission Control dialogue, then opens the lesson.

use tracing::debug;

use super::{Nav, RenderCtx, Screen, UiAction};
use crate::assets::AVATAR_IMAGE;
use crate::background::Background;
use crate::domain::ScreenName;
use crate::protocol::ScreenView;

pub const NEXT_LABEL: &str = "Next";
pub const START_LABEL: &str = "🚀 Start Lesson";

pub struct WelcomeScreen {
  dialogue: Vec<String>,
  index: usize,
  background: Option<Background>,
}

impl WelcomeScreen {
  /// `dialogue` must be non-empty.
  pub fn new(dialogue: Vec<String>, background: Option<Background>) -> Self {
    Self { dialogue, index: 0, background }
  }

  #[cfg(test)]
  pub fn index(&self) -> usize { self.index }

  fn on_last_line(&self) -> bool {
    self.index + 1 >= self.dialogue.len()
  }
}

impl Screen for WelcomeScreen {
  fn name(&self) -> ScreenName { ScreenName::Welcome }

  // Coming back to Welcome replays the briefing from the top.
  fn mount(&mut self, _nav: &mut Nav<'_>) {
    self.index = 0;
  }

  fn handle(&mut self, action: UiAction, nav: &mut Nav<'_>) -> bool {
    match action {
      UiAction::Next => {
        if self.on_last_line() {
          nav.show_screen(ScreenName::Lesson);
        } else {
          self.index += 1;
          debug!(target: "nav", step = self.index, "Welcome dialogue advanced");
        }
        true
      }
      _ => false,
    }
  }

  fn render(&self, ctx: &RenderCtx<'_>) -> ScreenView {
    ScreenView::Welcome {
      line: self.dialogue.get(self.index).cloned().unwrap_or_default(),
      step: self.index,
      steps: self.dialogue.len(),
      button: if self.on_last_line() { START_LABEL } else { NEXT_LABEL }.to_string(),
      avatar: ctx.assets.url(AVATAR_IMAGE),
    }
  }

  fn background(&self) -> Option<&Background> { self.background.as_ref() }

  fn background_mut(&mut self) -> Option<&mut Background> { self.background.as_mut() }
}
