//! The session loop: a single task that owns the `Controller`.
//!
//! Every screen mutation happens here. Client actions arrive on an mpsc queue,
//! summary lookups run on spawned tasks and their results are posted back
//! through a second queue. Progress appends go to one writer task that
//! handles them in arrival order. Renders and background
//! frames go out to every connected socket over a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::chat::LookupTicket;
use crate::controller::Controller;
use crate::progress::ProgressSink;
use crate::protocol::{ServerWsMessage, SessionOut};
use crate::screens::{Effect, UiAction};
use crate::summary::{fetch_summary, SummaryProvider};

const EVENT_QUEUE: usize = 64;
const BROADCAST_QUEUE: usize = 64;

pub enum SessionEvent {
  Ui(UiAction),
  Resize { width: u32, height: u32 },
  SaveProgress { lesson: Option<String>, score: Option<u32>, reply: Option<oneshot::Sender<bool>> },
  /// Current screen render, for a client that just joined.
  Render(oneshot::Sender<ServerWsMessage>),
  Snapshot(oneshot::Sender<SessionOut>),
}

struct LookupDone {
  ticket: LookupTicket,
  reply: String,
}

struct SaveJob {
  lesson: String,
  score: u32,
  reply: Option<oneshot::Sender<bool>>,
}

/// Cloneable entry point into the session loop.
#[derive(Clone)]
pub struct SessionHandle {
  events: mpsc::Sender<SessionEvent>,
  updates: broadcast::Sender<ServerWsMessage>,
}

impl SessionHandle {
  pub async fn send(&self, event: SessionEvent) -> bool {
    self.events.send(event).await.is_ok()
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ServerWsMessage> {
    self.updates.subscribe()
  }

  pub async fn render(&self) -> Option<ServerWsMessage> {
    let (tx, rx) = oneshot::channel();
    if !self.send(SessionEvent::Render(tx)).await {
      return None;
    }
    rx.await.ok()
  }

  pub async fn snapshot(&self) -> Option<SessionOut> {
    let (tx, rx) = oneshot::channel();
    if !self.send(SessionEvent::Snapshot(tx)).await {
      return None;
    }
    rx.await.ok()
  }

  pub async fn save_progress(&self, lesson: Option<String>, score: Option<u32>) -> bool {
    let (tx, rx) = oneshot::channel();
    let event = SessionEvent::SaveProgress { lesson, score, reply: Some(tx) };
    if !self.send(event).await {
      return false;
    }
    rx.await.unwrap_or(false)
  }
}

pub struct SessionConfig {
  /// Animation tick; `None` disables background frames.
  pub tick: Option<Duration>,
  pub lesson_name: String,
}

struct SessionLoop {
  controller: Controller,
  provider: Arc<dyn SummaryProvider>,
  updates: broadcast::Sender<ServerWsMessage>,
  done_tx: mpsc::UnboundedSender<LookupDone>,
  saves: mpsc::UnboundedSender<SaveJob>,
  shutdown: Arc<Notify>,
  lesson_name: String,
}

/// Start the loop. It ends when every handle is dropped or the learner exits;
/// on exit `shutdown` is notified.
pub fn spawn_session(
  controller: Controller,
  provider: Arc<dyn SummaryProvider>,
  cfg: SessionConfig,
  shutdown: Arc<Notify>,
) -> (SessionHandle, JoinHandle<()>) {
  let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
  let (updates, _) = broadcast::channel(BROADCAST_QUEUE);
  let (done_tx, done_rx) = mpsc::unbounded_channel();
  let (saves, save_rx) = mpsc::unbounded_channel();
  tokio::spawn(progress_writer(controller.progress_sink().clone(), save_rx, updates.clone()));

  let state = SessionLoop {
    controller,
    provider,
    updates: updates.clone(),
    done_tx,
    saves,
    shutdown,
    lesson_name: cfg.lesson_name,
  };
  let task = tokio::spawn(state.run(events_rx, done_rx, cfg.tick));
  (SessionHandle { events: events_tx, updates }, task)
}

impl SessionLoop {
  #[instrument(level = "info", name = "session", skip_all)]
  async fn run(
    mut self,
    mut events: mpsc::Receiver<SessionEvent>,
    mut done: mpsc::UnboundedReceiver<LookupDone>,
    tick: Option<Duration>,
  ) {
    let animate = tick.is_some();
    let mut ticker = tokio::time::interval(tick.unwrap_or(Duration::from_secs(3600)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(target: "zerog_lesson", animate, screen = %self.controller.current(), "Session loop started");

    loop {
      tokio::select! {
        maybe = events.recv() => match maybe {
          Some(event) => {
            if self.on_event(event) {
              break;
            }
          }
          None => break,
        },
        Some(LookupDone { ticket, reply }) = done.recv() => {
          if self.controller.deliver_lookup(&ticket, reply) {
            self.publish_screen();
          }
        }
        _ = ticker.tick(), if animate => {
          if let Some(frame) = self.controller.tick() {
            let _ = self.updates.send(ServerWsMessage::Frame { screen: self.controller.current(), frame });
          }
        }
      }
    }
    info!(target: "zerog_lesson", "Session loop stopped");
  }

  /// Returns true when the loop should stop.
  fn on_event(&mut self, event: SessionEvent) -> bool {
    match event {
      SessionEvent::Ui(action) => {
        if let Some(effects) = self.controller.handle(action) {
          self.publish_screen();
          return self.run_effects(effects);
        }
      }
      SessionEvent::Resize { width, height } => {
        self.controller.resize(width, height);
        if let Some(frame) = self.controller.frame() {
          let _ = self.updates.send(ServerWsMessage::Frame { screen: self.controller.current(), frame });
        }
      }
      SessionEvent::SaveProgress { lesson, score, reply } => {
        let lesson = lesson.unwrap_or_else(|| self.lesson_name.clone());
        let score = score.unwrap_or_else(|| self.controller.score());
        if let Err(mpsc::error::SendError(job)) = self.saves.send(SaveJob { lesson, score, reply }) {
          warn!(target: "zerog_lesson", lesson = %job.lesson, "Progress writer gone; line not saved");
          if let Some(reply) = job.reply {
            let _ = reply.send(false);
          }
        }
      }
      SessionEvent::Render(reply) => {
        let _ = reply.send(self.screen_message());
      }
      SessionEvent::Snapshot(reply) => {
        let _ = reply.send(self.controller.snapshot());
      }
    }
    false
  }

  fn run_effects(&mut self, effects: Vec<Effect>) -> bool {
    let mut exit = false;
    for effect in effects {
      match effect {
        Effect::Lookup(ticket) => self.spawn_lookup(ticket),
        Effect::Exit => exit = true,
      }
    }
    if exit {
      info!(target: "zerog_lesson", "Exit requested by learner");
      let _ = self.updates.send(ServerWsMessage::Goodbye);
      self.shutdown.notify_one();
    }
    exit
  }

  fn spawn_lookup(&self, ticket: LookupTicket) {
    let provider = self.provider.clone();
    let done = self.done_tx.clone();
    debug!(target: "chat", user_turn = ticket.user_turn, "Dispatching summary lookup");
    tokio::spawn(async move {
      let reply = fetch_summary(provider.as_ref(), &ticket.topic).await;
      if done.send(LookupDone { ticket, reply }).is_err() {
        warn!(target: "chat", "Session loop gone; summary reply discarded");
      }
    });
  }

  fn screen_message(&self) -> ServerWsMessage {
    ServerWsMessage::Screen { cursor: self.controller.cursor(), view: self.controller.render() }
  }

  fn publish_screen(&self) {
    // no subscribers is fine
    let _ = self.updates.send(self.screen_message());
  }
}

/// Appends one line per job, strictly in the order the loop queued them.
async fn progress_writer(
  sink: ProgressSink,
  mut jobs: mpsc::UnboundedReceiver<SaveJob>,
  updates: broadcast::Sender<ServerWsMessage>,
) {
  while let Some(SaveJob { lesson, score, reply }) = jobs.recv().await {
    let ok = sink.append(&lesson, score).await;
    let _ = updates.send(ServerWsMessage::ProgressSaved { lesson, score, ok });
    if let Some(reply) = reply {
      let _ = reply.send(ok);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use crate::assets::Assets;
  use crate::config::LessonConfig;
  use crate::domain::{ScreenName, Speaker};
  use crate::error::{LessonError, Result};
  use crate::protocol::ScreenView;
  use crate::seeds::GREETING_REPLY;
  use crate::summary::FALLBACK_REPLY;

  #[derive(Default)]
  struct CountingProvider {
    calls: AtomicUsize,
    fail: bool,
  }

  #[async_trait::async_trait]
  impl SummaryProvider for CountingProvider {
    async fn lookup(&self, topic: &str) -> Result<String> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.fail {
        Err(LessonError::MissingExtract)
      } else {
        Ok(format!("{} is a thing in space.", topic))
      }
    }
  }

  fn start(provider: Arc<CountingProvider>, progress_path: Option<String>) -> (SessionHandle, Arc<Notify>) {
    let mut cfg = LessonConfig::default();
    if let Some(p) = progress_path {
      cfg.progress.path = p;
    }
    let controller = Controller::new(&cfg, Assets::default());
    let shutdown = Arc::new(Notify::new());
    let (handle, _task) = spawn_session(
      controller,
      provider,
      SessionConfig { tick: None, lesson_name: "Zero Gravity".into() },
      shutdown.clone(),
    );
    (handle, shutdown)
  }

  async fn next_chat(rx: &mut broadcast::Receiver<ServerWsMessage>) -> Vec<crate::domain::Turn> {
    loop {
      let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.expect("timed out").unwrap();
      if let ServerWsMessage::Screen { view: ScreenView::Chat { transcript, .. }, .. } = msg {
        return transcript;
      }
    }
  }

  async fn open_chat(handle: &SessionHandle) {
    handle.send(SessionEvent::Ui(UiAction::Next)).await;
    for _ in 0..4 {
      handle.send(SessionEvent::Ui(UiAction::Next)).await;
    }
    handle.send(SessionEvent::Ui(UiAction::OpenChat)).await;
    assert_eq!(handle.snapshot().await.unwrap().screen, ScreenName::Chat);
  }

  #[tokio::test]
  async fn rule_hit_makes_no_lookup() {
    let provider = Arc::new(CountingProvider::default());
    let (handle, _) = start(provider.clone(), None);
    open_chat(&handle).await;
    let mut rx = handle.subscribe();
    handle.send(SessionEvent::Ui(UiAction::Ask("Hello there".into()))).await;
    let transcript = next_chat(&mut rx).await;
    assert_eq!(transcript.last().unwrap().text, GREETING_REPLY);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn failed_lookup_posts_fallback_back_to_the_loop() {
    let provider = Arc::new(CountingProvider { fail: true, ..Default::default() });
    let (handle, _) = start(provider.clone(), None);
    open_chat(&handle).await;
    let mut rx = handle.subscribe();
    handle.send(SessionEvent::Ui(UiAction::Ask("Quasar".into()))).await;

    // first render: user turn only
    let first = next_chat(&mut rx).await;
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].speaker, Speaker::User);

    // second render: the posted-back reply
    let second = next_chat(&mut rx).await;
    assert_eq!(second.len(), 3);
    assert_eq!(second[2].speaker, Speaker::Avatar);
    assert_eq!(second[2].text, FALLBACK_REPLY);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn successful_lookup_uses_the_summary() {
    let provider = Arc::new(CountingProvider::default());
    let (handle, _) = start(provider, None);
    open_chat(&handle).await;
    let mut rx = handle.subscribe();
    handle.send(SessionEvent::Ui(UiAction::Ask("Quasar".into()))).await;
    next_chat(&mut rx).await;
    let transcript = next_chat(&mut rx).await;
    assert_eq!(transcript.last().unwrap().text, "Quasar is a thing in space.");
  }

  #[tokio::test]
  async fn perfect_quiz_over_the_loop() {
    let (handle, _) = start(Arc::new(CountingProvider::default()), None);
    for _ in 0..5 {
      handle.send(SessionEvent::Ui(UiAction::Next)).await;
    }
    handle.send(SessionEvent::Ui(UiAction::TakeQuiz)).await;
    for _ in 0..3 {
      handle.send(SessionEvent::Ui(UiAction::Select(0))).await;
      handle.send(SessionEvent::Ui(UiAction::Next)).await;
    }
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.screen, ScreenName::Result);
    assert_eq!(snap.score, 3);
  }

  #[tokio::test]
  async fn exit_notifies_shutdown() {
    let (handle, shutdown) = start(Arc::new(CountingProvider::default()), None);
    let notified = shutdown.notified();
    for _ in 0..5 {
      handle.send(SessionEvent::Ui(UiAction::Next)).await;
    }
    handle.send(SessionEvent::Ui(UiAction::TakeQuiz)).await;
    for _ in 0..3 {
      handle.send(SessionEvent::Ui(UiAction::Select(1))).await;
      handle.send(SessionEvent::Ui(UiAction::Next)).await;
    }
    handle.send(SessionEvent::Ui(UiAction::Exit)).await;
    tokio::time::timeout(Duration::from_secs(5), notified).await.expect("shutdown not signalled");
  }

  #[tokio::test]
  async fn save_progress_defaults_to_latest_score() {
    let path = std::env::temp_dir().join(format!("zerog-session-{}.txt", uuid::Uuid::new_v4()));
    let (handle, _) = start(Arc::new(CountingProvider::default()), Some(path.display().to_string()));
    assert!(handle.save_progress(None, None).await);
    assert!(handle.save_progress(Some("Orbits".into()), Some(2)).await);
    let content = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(content, "Zero Gravity - Score: 0\nOrbits - Score: 2\n");
    let _ = tokio::fs::remove_file(&path).await;
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn unawaited_saves_land_in_call_order() {
    let path = std::env::temp_dir().join(format!("zerog-order-{}.txt", uuid::Uuid::new_v4()));
    let (handle, _) = start(Arc::new(CountingProvider::default()), Some(path.display().to_string()));
    for score in 0..200u32 {
      let event = SessionEvent::SaveProgress { lesson: Some("L".into()), score: Some(score), reply: None };
      assert!(handle.send(event).await);
    }
    // queued behind every earlier job
    assert!(handle.save_progress(Some("L".into()), Some(200)).await);

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let expected: String = (0..=200u32).map(|s| ProgressSink::format_line("L", s)).collect();
    assert_eq!(content, expected);
    let _ = tokio::fs::remove_file(&path).await;
  }

  #[tokio::test]
  async fn join_gets_current_screen() {
    let (handle, _) = start(Arc::new(CountingProvider::default()), None);
    match handle.render().await {
      Some(ServerWsMessage::Screen { view, .. }) => assert_eq!(view.name(), ScreenName::Welcome),
      other => panic!("unexpected {:?}", other),
    }
  }
}
