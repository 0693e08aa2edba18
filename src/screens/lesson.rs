//! Lesson screen: static content with buttons to the quiz, the chat, and back.

use super::{Nav, RenderCtx, Screen, UiAction};
use crate::background::Background;
use crate::domain::ScreenName;
use crate::protocol::ScreenView;
use crate::seeds::LessonContent;

pub struct LessonScreen {
  content: LessonContent,
  background: Option<Background>,
}

impl LessonScreen {
  pub fn new(content: LessonContent, background: Option<Background>) -> Self {
    Self { content, background }
  }
}

impl Screen for LessonScreen {
  fn name(&self) -> ScreenName { ScreenName::Lesson }

  fn handle(&mut self, action: UiAction, nav: &mut Nav<'_>) -> bool {
    let target = match action {
      UiAction::TakeQuiz => ScreenName::Quiz,
      UiAction::OpenChat => ScreenName::Chat,
      UiAction::Back => ScreenName::Welcome,
      _ => return false,
    };
    nav.show_screen(target);
    true
  }

  fn render(&self, _ctx: &RenderCtx<'_>) -> ScreenView {
    ScreenView::Lesson { lesson: self.content.clone() }
  }

  fn background(&self) -> Option<&Background> { self.background.as_ref() }

  fn background_mut(&mut self) -> Option<&mut Background> { self.background.as_mut() }
}
