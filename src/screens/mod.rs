//! Screens and the capability they share.
//!
//! A screen is created once and retained by the controller. It reacts to the
//! learner's button presses through a `Nav` handle, which is the only way a
//! screen can touch session state or ask for another screen.

use crate::assets::Assets;
use crate::background::Background;
use crate::chat::LookupTicket;
use crate::domain::ScreenName;
use crate::progress::ProgressSink;
use crate::protocol::ScreenView;

pub mod chat;
pub mod lesson;
pub mod quiz;
pub mod result;
pub mod welcome;

pub use chat::ChatScreen;
pub use lesson::LessonScreen;
pub use quiz::QuizScreen;
pub use result::ResultScreen;
pub use welcome::WelcomeScreen;

/// Button presses and text submitted by the learner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
  Next,
  Back,
  TakeQuiz,
  OpenChat,
  Select(usize),
  Ask(String),
  Exit,
}

/// Work a screen asks for that must run off the session loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
  Lookup(LookupTicket),
  Exit,
}

/// Process-wide session state. Owned by the controller.
#[derive(Debug)]
pub struct Session {
  pub current: ScreenName,
  pub score: u32,
  /// Questions in the bank; the denominator on the Result screen.
  pub total: u32,
  /// Quiz runs that reached Finished in this process.
  pub completed_runs: u32,
  pub progress: ProgressSink,
}

impl Session {
  pub fn new(total: u32, progress: ProgressSink) -> Self {
    Self { current: ScreenName::Welcome, score: 0, total, completed_runs: 0, progress }
  }
}

/// Controller handle passed to screens while they handle an event.
pub struct Nav<'a> {
  session: &'a mut Session,
  requested: Option<ScreenName>,
  effects: Vec<Effect>,
}

impl<'a> Nav<'a> {
  pub fn new(session: &'a mut Session) -> Self {
    Self { session, requested: None, effects: Vec::new() }
  }

  /// Ask the controller to switch screens once the handler returns.
  pub fn show_screen(&mut self, name: ScreenName) {
    self.requested = Some(name);
  }

  /// Record the final score of a finished quiz run.
  pub fn set_score(&mut self, score: u32) {
    self.session.score = score;
    self.session.completed_runs += 1;
  }

  pub fn lookup(&mut self, ticket: LookupTicket) {
    self.effects.push(Effect::Lookup(ticket));
  }

  pub fn exit(&mut self) {
    self.effects.push(Effect::Exit);
  }

  pub fn into_parts(self) -> (Option<ScreenName>, Vec<Effect>) {
    (self.requested, self.effects)
  }
}

/// Read-only inputs for rendering.
pub struct RenderCtx<'a> {
  pub session: &'a Session,
  pub assets: &'a Assets,
}

pub trait Screen {
  fn name(&self) -> ScreenName;

  /// Called each time the screen becomes visible.
  fn mount(&mut self, _nav: &mut Nav<'_>) {}

  /// Called when another screen replaces this one.
  fn unmount(&mut self) {}

  /// Returns false when the action means nothing on this screen.
  fn handle(&mut self, action: UiAction, nav: &mut Nav<'_>) -> bool;

  fn render(&self, ctx: &RenderCtx<'_>) -> ScreenView;

  fn background(&self) -> Option<&Background> { None }

  fn background_mut(&mut self) -> Option<&mut Background> { None }
}
