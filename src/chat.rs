//! Chat router: turns one user utterance into one avatar reply.
//!
//! `ask` runs synchronously on the session loop. A keyword hit answers right
//! away; otherwise a `LookupTicket` is handed back and the reply is completed
//! later with `complete`, once the summary service has answered off-loop.

use tracing::{debug, instrument};

use crate::domain::{Speaker, Turn};
use crate::knowledge::{KnowledgeBase, Route};

/// Chat input placeholder; submitting it verbatim counts as no input.
pub const PLACEHOLDER: &str = "Write here...";

/// A pending summary lookup, stamped with the user turn it answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTicket {
  pub user_turn: u64,
  pub topic: String,
  /// Chat visit the question was asked in; replies from older visits are dropped.
  pub visit: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Asked {
  /// Empty or placeholder input: transcript untouched.
  Ignored,
  /// Canned reply appended.
  Answered,
  /// User turn appended; reply pending on the summary service.
  Lookup(LookupTicket),
}

pub struct ChatRouter {
  kb: KnowledgeBase,
  transcript: Vec<Turn>,
  next_id: u64,
}

impl ChatRouter {
  /// New transcript, opened with a single avatar greeting.
  pub fn new(kb: KnowledgeBase, opening: &str) -> Self {
    let mut router = Self { kb, transcript: Vec::new(), next_id: 1 };
    router.push(Speaker::Avatar, opening.to_string(), None);
    router
  }

  fn push(&mut self, speaker: Speaker, text: String, in_reply_to: Option<u64>) -> u64 {
    let id = self.next_id;
    self.next_id += 1;
    self.transcript.push(Turn { id, speaker, text, in_reply_to });
    id
  }

  #[instrument(level = "debug", skip(self, utterance), fields(len = utterance.len()))]
  pub fn ask(&mut self, utterance: &str, visit: u64) -> Asked {
    let text = utterance.trim();
    if text.is_empty() || text == PLACEHOLDER {
      return Asked::Ignored;
    }

    let user_turn = self.push(Speaker::User, text.to_string(), None);
    let normalized = text.to_lowercase();

    match self.kb.route(&normalized) {
      Route::Canned(reply) => {
        let reply = reply.to_string();
        self.push(Speaker::Avatar, reply, Some(user_turn));
        debug!(target: "chat", user_turn, "Answered from knowledge base");
        Asked::Answered
      }
      Route::Lookup => {
        debug!(target: "chat", user_turn, "No rule matched; summary lookup");
        Asked::Lookup(LookupTicket { user_turn, topic: text.to_string(), visit })
      }
    }
  }

  /// Append the avatar reply for a finished lookup.
  pub fn complete(&mut self, ticket: &LookupTicket, reply: String) -> u64 {
    self.push(Speaker::Avatar, reply, Some(ticket.user_turn))
  }

  pub fn transcript(&self) -> &[Turn] { &self.transcript }

  /// Plain-text transcript, "You: …" / "Avatar: …".
  pub fn transcript_text(&self) -> String {
    let mut out = String::new();
    for turn in &self.transcript {
      match turn.speaker {
        Speaker::User => out.push_str(&format!("You: {}\n", turn.text)),
        Speaker::Avatar => out.push_str(&format!("Avatar: {}\n\n", turn.text)),
      }
    }
    out
  }
}
