//! Navigation controller: owns the session and the five retained screens.
//!
//! All methods run on the session loop. Screens ask for navigation through
//! `Nav`; the controller applies the request after the handler returns, so a
//! screen may chain into another one on mount (an empty quiz goes straight to
//! Result).

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::assets::{Assets, CURSOR_IMAGE};
use crate::background::{Background, Frame};
use crate::chat::{ChatRouter, LookupTicket};
use crate::config::LessonConfig;
use crate::domain::ScreenName;
use crate::knowledge::KnowledgeBase;
use crate::progress::ProgressSink;
use crate::protocol::{ScreenView, SessionOut};
use crate::screens::{
  ChatScreen, Effect, LessonScreen, Nav, QuizScreen, RenderCtx, ResultScreen, Screen, Session, UiAction,
  WelcomeScreen,
};
use crate::seeds::CHAT_OPENING;

const SCREEN_COUNT: usize = 5;

struct Screens {
  welcome: WelcomeScreen,
  lesson: LessonScreen,
  quiz: QuizScreen,
  result: ResultScreen,
  chat: ChatScreen,
}

impl Screens {
  fn get(&self, name: ScreenName) -> &dyn Screen {
    match name {
      ScreenName::Welcome => &self.welcome,
      ScreenName::Lesson => &self.lesson,
      ScreenName::Quiz => &self.quiz,
      ScreenName::Result => &self.result,
      ScreenName::Chat => &self.chat,
    }
  }

  fn get_mut(&mut self, name: ScreenName) -> &mut dyn Screen {
    match name {
      ScreenName::Welcome => &mut self.welcome,
      ScreenName::Lesson => &mut self.lesson,
      ScreenName::Quiz => &mut self.quiz,
      ScreenName::Result => &mut self.result,
      ScreenName::Chat => &mut self.chat,
    }
  }
}

pub struct Controller {
  session: Session,
  screens: Screens,
  assets: Assets,
}

impl Controller {
  /// Build every screen from config. The Welcome screen is visible afterwards.
  pub fn new(cfg: &LessonConfig, assets: Assets) -> Self {
    let anim = &cfg.animation;
    let bg = |stars, comets| Some(Background::new(stars, comets, anim.width, anim.height));

    let bank = Arc::new(cfg.quiz_bank());
    let total = u32::try_from(bank.len()).unwrap_or(u32::MAX);
    let kb = KnowledgeBase::new(cfg.rules());
    info!(target: "chat", rules = kb.len(), "Knowledge base loaded");
    let router = ChatRouter::new(kb, CHAT_OPENING);

    let screens = Screens {
      welcome: WelcomeScreen::new(cfg.dialogue(), bg(90, 2)),
      lesson: LessonScreen::new(cfg.lesson(), bg(100, 2)),
      quiz: QuizScreen::new(bank, bg(80, 8)),
      result: ResultScreen::new(bg(80, 2)),
      chat: ChatScreen::new(router),
    };
    let session = Session::new(total, ProgressSink::new(&cfg.progress.path));
    info!(target: "nav", questions = total, progress = %session.progress.path().display(), "Controller ready");

    let mut controller = Self { session, screens, assets };
    controller.screens.welcome.mount(&mut Nav::new(&mut controller.session));
    controller
  }

  pub fn current(&self) -> ScreenName { self.session.current }

  pub fn score(&self) -> u32 { self.session.score }

  pub fn progress_sink(&self) -> &ProgressSink { &self.session.progress }

  #[cfg(test)]
  pub fn session(&self) -> &Session { &self.session }

  /// Make `name` the visible screen. Switching to the current screen does nothing.
  #[instrument(level = "debug", skip(self), fields(from = %self.session.current))]
  pub fn show_screen(&mut self, name: ScreenName) -> Vec<Effect> {
    let mut effects = Vec::new();
    let mut next = Some(name);
    let mut hops = 0;

    while let Some(target) = next.take() {
      if target == self.session.current {
        break;
      }
      hops += 1;
      if hops > SCREEN_COUNT {
        warn!(target: "nav", %target, "Navigation chain too long; stopping");
        break;
      }

      let from = self.session.current;
      self.screens.get_mut(from).unmount();
      self.session.current = target;
      info!(target: "nav", %from, to = %target, "Screen shown");

      let screen = self.screens.get_mut(target);
      debug_assert_eq!(screen.name(), target);
      let mut nav = Nav::new(&mut self.session);
      screen.mount(&mut nav);
      let (requested, more) = nav.into_parts();
      effects.extend(more);
      next = requested;
    }
    effects
  }

  /// Feed one learner action to the visible screen. `None` means it was ignored.
  pub fn handle(&mut self, action: UiAction) -> Option<Vec<Effect>> {
    let current = self.session.current;
    let mut nav = Nav::new(&mut self.session);
    let handled = self.screens.get_mut(current).handle(action, &mut nav);
    let (requested, mut effects) = nav.into_parts();

    if !handled && requested.is_none() {
      debug!(target: "nav", screen = %current, "Action ignored on this screen");
      return None;
    }
    if let Some(target) = requested {
      effects.extend(self.show_screen(target));
    }
    Some(effects)
  }

  /// Post a finished summary lookup back to the chat. False if it was dropped.
  pub fn deliver_lookup(&mut self, ticket: &LookupTicket, reply: String) -> bool {
    self.screens.chat.deliver(ticket, reply)
  }

  pub fn render(&self) -> ScreenView {
    let ctx = RenderCtx { session: &self.session, assets: &self.assets };
    self.screens.get(self.session.current).render(&ctx)
  }

  /// Custom pointer image, when present.
  pub fn cursor(&self) -> Option<String> {
    self.assets.url(CURSOR_IMAGE)
  }

  /// Advance the visible screen's background, if it has one.
  pub fn tick(&mut self) -> Option<Frame> {
    let bg = self.screens.get_mut(self.session.current).background_mut()?;
    bg.tick();
    Some(bg.frame())
  }

  pub fn resize(&mut self, width: u32, height: u32) {
    if let Some(bg) = self.screens.get_mut(self.session.current).background_mut() {
      bg.resize(width, height);
    }
  }

  pub fn frame(&self) -> Option<Frame> {
    self.screens.get(self.session.current).background().map(Background::frame)
  }

  pub fn snapshot(&self) -> SessionOut {
    SessionOut {
      screen: self.session.current,
      score: self.session.score,
      total: self.session.total,
      completed_runs: self.session.completed_runs,
      transcript: self.screens.chat.router().transcript_text(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{MedalTier, Speaker};
  use crate::seeds::{GREETING_REPLY, MICROGRAVITY_REPLY};
  use crate::summary::{fetch_summary, SummaryProvider, FALLBACK_REPLY};

  fn controller_with(cfg: LessonConfig) -> Controller {
    Controller::new(&cfg, Assets::default())
  }

  fn controller() -> Controller {
    controller_with(LessonConfig::default())
  }

  fn press(c: &mut Controller, actions: &[UiAction]) {
    for a in actions {
      c.handle(a.clone());
    }
  }

  fn to_quiz(c: &mut Controller) {
    c.show_screen(ScreenName::Lesson);
    c.handle(UiAction::TakeQuiz);
    assert_eq!(c.current(), ScreenName::Quiz);
  }

  use UiAction::{Next, Select};

  #[test]
  fn starts_on_welcome_and_walks_to_lesson() {
    let mut c = controller();
    assert_eq!(c.current(), ScreenName::Welcome);
    for _ in 0..4 {
      c.handle(Next);
      assert_eq!(c.current(), ScreenName::Welcome);
    }
    c.handle(Next);
    assert_eq!(c.current(), ScreenName::Lesson);
  }

  #[test]
  fn perfect_quiz_reaches_expert_result() {
    let mut c = controller();
    to_quiz(&mut c);
    press(&mut c, &[Select(0), Next, Select(0), Next, Select(0), Next]);
    assert_eq!(c.current(), ScreenName::Result);
    assert_eq!(c.score(), 3);
    match c.render() {
      ScreenView::Result { tier, title, .. } => {
        assert_eq!(tier, MedalTier::ZeroGExpert);
        assert_eq!(title, "Zero-G Expert");
      }
      other => panic!("unexpected view {:?}", other),
    }
  }

  #[test]
  fn mixed_quiz_reaches_bronze_result() {
    let mut c = controller();
    to_quiz(&mut c);
    press(&mut c, &[Select(1), Next, Select(0), Next, Select(2), Next]);
    assert_eq!(c.current(), ScreenName::Result);
    assert_eq!(c.score(), 1);
    assert!(matches!(c.render(), ScreenView::Result { tier: MedalTier::Bronze, .. }));
  }

  #[test]
  fn locked_answer_scores_first_selection_only() {
    let mut c = controller();
    to_quiz(&mut c);
    c.handle(Select(0));
    assert_eq!(c.handle(Select(2)), None);
    match c.render() {
      ScreenView::Quiz { feedback, selected, .. } => {
        assert_eq!(feedback, Some(crate::domain::Feedback::Correct));
        assert_eq!(selected, Some(0));
      }
      other => panic!("unexpected view {:?}", other),
    }
    c.handle(Next);
    assert_eq!(c.screens.quiz.run().score(), 1);
  }

  #[test]
  fn show_screen_is_idempotent() {
    let mut c = controller();
    c.show_screen(ScreenName::Lesson);
    let before = c.render();
    assert!(c.show_screen(ScreenName::Lesson).is_empty());
    assert_eq!(c.current(), ScreenName::Lesson);
    assert_eq!(c.render(), before);
  }

  #[test]
  fn reentering_welcome_replays_dialogue() {
    let mut c = controller();
    press(&mut c, &[Next, Next]);
    c.show_screen(ScreenName::Lesson);
    c.handle(UiAction::Back);
    assert_eq!(c.current(), ScreenName::Welcome);
    assert!(matches!(c.render(), ScreenView::Welcome { step: 0, .. }));
  }

  #[test]
  fn result_back_restarts_quiz() {
    let mut c = controller();
    to_quiz(&mut c);
    press(&mut c, &[Select(0), Next, Select(0), Next, Select(0), Next]);
    c.handle(UiAction::Back);
    assert_eq!(c.current(), ScreenName::Quiz);
    assert!(matches!(c.render(), ScreenView::Quiz { number: 1, options_enabled: true, .. }));
    // the stored score survives until the next run finishes
    assert_eq!(c.score(), 3);
  }

  #[test]
  fn leaving_quiz_midway_discards_the_run() {
    let mut c = controller();
    to_quiz(&mut c);
    press(&mut c, &[Select(0), Next]);
    c.handle(UiAction::Back);
    assert_eq!(c.current(), ScreenName::Lesson);
    c.handle(UiAction::TakeQuiz);
    assert_eq!(c.screens.quiz.run().cursor(), 0);
    assert_eq!(c.session().completed_runs, 0);
  }

  #[test]
  fn empty_bank_goes_straight_to_result() {
    let cfg: LessonConfig = toml::from_str("questions = []").unwrap();
    let mut c = controller_with(cfg);
    c.show_screen(ScreenName::Lesson);
    c.handle(UiAction::TakeQuiz);
    assert_eq!(c.current(), ScreenName::Result);
    assert_eq!(c.score(), 0);
    assert!(matches!(c.render(), ScreenView::Result { tier: MedalTier::NoMedal, total: 0, .. }));
  }

  #[test]
  fn exit_only_from_result() {
    let mut c = controller();
    assert_eq!(c.handle(UiAction::Exit), None);
    to_quiz(&mut c);
    press(&mut c, &[Select(0), Next, Select(0), Next, Select(0), Next]);
    assert_eq!(c.handle(UiAction::Exit), Some(vec![Effect::Exit]));
  }

  #[test]
  fn chat_rule_hits_answer_without_effects() {
    let mut c = controller();
    c.show_screen(ScreenName::Lesson);
    c.handle(UiAction::OpenChat);
    assert_eq!(c.handle(UiAction::Ask("Hello there".into())), Some(vec![]));
    assert_eq!(c.handle(UiAction::Ask("Tell me about zero gravity please".into())), Some(vec![]));
    let ScreenView::Chat { transcript, .. } = c.render() else { panic!("not chat") };
    assert_eq!(transcript[2].text, GREETING_REPLY);
    assert_eq!(transcript[4].text, MICROGRAVITY_REPLY);
  }

  struct Down;

  #[async_trait::async_trait]
  impl SummaryProvider for Down {
    async fn lookup(&self, _topic: &str) -> crate::error::Result<String> {
      Err(crate::error::LessonError::Endpoint("offline".into()))
    }
  }

  #[tokio::test]
  async fn failing_lookup_appends_fallback_once() {
    let mut c = controller();
    c.show_screen(ScreenName::Chat);
    let effects = c.handle(UiAction::Ask("Quasar".into())).unwrap();
    let [Effect::Lookup(ticket)] = effects.as_slice() else { panic!("expected lookup") };
    assert_eq!(ticket.topic, "Quasar");

    let reply = fetch_summary(&Down, &ticket.topic).await;
    assert!(c.deliver_lookup(ticket, reply));

    let ScreenView::Chat { transcript, pending, .. } = c.render() else { panic!("not chat") };
    assert_eq!(pending, 0);
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].speaker, Speaker::User);
    assert_eq!(transcript[2].speaker, Speaker::Avatar);
    assert!(transcript[2].text.starts_with(FALLBACK_REPLY));
  }

  #[test]
  fn animated_screens_tick_and_chat_does_not() {
    let mut c = controller();
    let frame = c.tick().expect("welcome is animated");
    assert_eq!(frame.stars.len(), 90);
    c.resize(320, 200);
    assert_eq!(c.frame().map(|f| f.width), Some(320));
    c.show_screen(ScreenName::Chat);
    assert!(c.tick().is_none());
  }

  #[test]
  fn snapshot_reflects_session() {
    let mut c = controller();
    to_quiz(&mut c);
    press(&mut c, &[Select(0), Next, Select(1), Next, Select(0), Next]);
    let snap = c.snapshot();
    assert_eq!(snap.screen, ScreenName::Result);
    assert_eq!(snap.score, 2);
    assert_eq!(snap.total, 3);
    assert_eq!(snap.completed_runs, 1);
    assert!(snap.transcript.starts_with("Avatar: "));
  }
}
