//! Result screen: latest score, medal tier, and the Exit button.

use super::{Nav, RenderCtx, Screen, UiAction};
use crate::background::Background;
use crate::domain::{MedalTier, ScreenName};
use crate::protocol::ScreenView;

pub struct ResultScreen {
  background: Option<Background>,
}

impl ResultScreen {
  pub fn new(background: Option<Background>) -> Self {
    Self { background }
  }
}

impl Screen for ResultScreen {
  fn name(&self) -> ScreenName { ScreenName::Result }

  fn handle(&mut self, action: UiAction, nav: &mut Nav<'_>) -> bool {
    match action {
      // back re-enters the quiz, which restarts it
      UiAction::Back => nav.show_screen(ScreenName::Quiz),
      UiAction::Exit => nav.exit(),
      _ => return false,
    }
    true
  }

  fn render(&self, ctx: &RenderCtx<'_>) -> ScreenView {
    let (score, total) = (ctx.session.score, ctx.session.total);
    let tier = MedalTier::for_score(score, total);
    ScreenView::Result {
      score,
      total,
      tier,
      title: tier.label().to_string(),
      message: tier.message(score, total),
      medal: ctx.assets.medal_url(tier),
    }
  }

  fn background(&self) -> Option<&Background> { self.background.as_ref() }

  fn background_mut(&mut self) -> Option<&mut Background> { self.background.as_mut() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assets::Assets;
  use crate::progress::ProgressSink;
  use crate::screens::{Effect, Session};

  #[test]
  fn renders_tier_from_session_score() {
    let mut session = Session::new(3, ProgressSink::new("unused.txt"));
    session.score = 3;
    let assets = Assets::default();
    match ResultScreen::new(None).render(&RenderCtx { session: &session, assets: &assets }) {
      ScreenView::Result { tier, message, medal, .. } => {
        assert_eq!(tier, MedalTier::ZeroGExpert);
        assert!(message.contains("Zero-G Expert"));
        assert!(medal.is_none());
      }
      other => panic!("unexpected view {:?}", other),
    }
  }

  #[test]
  fn exit_and_back() {
    let mut session = Session::new(3, ProgressSink::new("unused.txt"));
    let mut s = ResultScreen::new(None);

    let mut nav = Nav::new(&mut session);
    assert!(s.handle(UiAction::Exit, &mut nav));
    assert_eq!(nav.into_parts().1, vec![Effect::Exit]);

    let mut nav = Nav::new(&mut session);
    assert!(s.handle(UiAction::Back, &mut nav));
    assert_eq!(nav.into_parts().0, Some(ScreenName::Quiz));
  }
}
