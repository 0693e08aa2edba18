//! Quiz screen: owns one `QuizRun` per visit and hands the score over when it ends.

use std::sync::Arc;

use tracing::{debug, info};

use super::{Nav, RenderCtx, Screen, UiAction};
use crate::assets::QUIZ_IMAGE;
use crate::background::Background;
use crate::domain::{QuizBank, ScreenName};
use crate::protocol::ScreenView;
use crate::quiz::{Phase, QuizInput, QuizOutcome, QuizRun};

pub struct QuizScreen {
  bank: Arc<QuizBank>,
  run: QuizRun,
  background: Option<Background>,
}

impl QuizScreen {
  pub fn new(bank: Arc<QuizBank>, background: Option<Background>) -> Self {
    let run = QuizRun::new(bank.clone());
    Self { bank, run, background }
  }

  #[cfg(test)]
  pub fn run(&self) -> &QuizRun { &self.run }

  fn finish(&self, score: u32, nav: &mut Nav<'_>) {
    info!(target: "quiz", score, total = self.run.total(), "Quiz finished");
    nav.set_score(score);
    nav.show_screen(ScreenName::Result);
  }
}

impl Screen for QuizScreen {
  fn name(&self) -> ScreenName { ScreenName::Quiz }

  // Every visit starts a fresh run.
  fn mount(&mut self, nav: &mut Nav<'_>) {
    self.run = QuizRun::new(self.bank.clone());
    debug!(target: "quiz", total = self.run.total(), "Quiz run started");
    if self.run.is_finished() {
      self.finish(self.run.score(), nav);
    }
  }

  fn handle(&mut self, action: UiAction, nav: &mut Nav<'_>) -> bool {
    let input = match action {
      UiAction::Select(choice) => QuizInput::Select(choice),
      UiAction::Next => QuizInput::Advance,
      UiAction::Back => {
        nav.show_screen(ScreenName::Lesson);
        return true;
      }
      _ => return false,
    };

    match self.run.apply(input) {
      QuizOutcome::Ignored => {
        debug!(target: "quiz", ?input, phase = ?self.run.phase(), "Quiz input ignored");
        false
      }
      QuizOutcome::Answered(feedback) => {
        debug!(target: "quiz", question = self.run.cursor(), ?feedback, "Answer locked");
        true
      }
      QuizOutcome::NextQuestion(q) => {
        debug!(target: "quiz", question = q, "Next question");
        true
      }
      QuizOutcome::Finished { score } => {
        self.finish(score, nav);
        true
      }
    }
  }

  fn render(&self, ctx: &RenderCtx<'_>) -> ScreenView {
    let total = self.run.total();
    let number = (self.run.cursor() + 1).min(total.max(1));
    let (prompt, options) = match self.run.current() {
      Some(q) => (q.prompt.clone(), q.options.to_vec()),
      None => (String::new(), Vec::new()),
    };
    let locked = self.run.phase() == Phase::AnswerLocked;
    ScreenView::Quiz {
      number,
      total,
      progress: format!("Question {} of {}", number, total),
      prompt,
      options,
      options_enabled: self.run.phase() == Phase::AwaitingAnswer,
      selected: self.run.selected(),
      feedback: self.run.feedback(),
      feedback_text: self.run.feedback().map(|f| f.message().to_string()),
      show_next: locked,
      image: ctx.assets.url(QUIZ_IMAGE),
    }
  }

  fn background(&self) -> Option<&Background> { self.background.as_ref() }

  fn background_mut(&mut self) -> Option<&mut Background> { self.background.as_mut() }
}
