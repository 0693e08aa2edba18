//! Domain models: screen names, quiz bank, chat turns, feedback and medal tiers.

use serde::{Deserialize, Serialize};

/// The fixed set of screens the navigation controller switches between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenName {
  Welcome,
  Lesson,
  Quiz,
  Result,
  Chat,
}
impl Default for ScreenName {
  fn default() -> Self { ScreenName::Welcome }
}

impl ScreenName {
  pub fn as_str(&self) -> &'static str {
    match self {
      ScreenName::Welcome => "welcome",
      ScreenName::Lesson => "lesson",
      ScreenName::Quiz => "quiz",
      ScreenName::Result => "result",
      ScreenName::Chat => "chat",
    }
  }
}

impl std::fmt::Display for ScreenName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub prompt: String,
  pub options: [String; OPTION_COUNT],
  /// Index (0..3) of the single correct option.
  pub correct: usize,
}

impl Question {
  pub fn is_correct(&self, choice: usize) -> bool {
    choice == self.correct
  }
}

/// Immutable, ordered question set. Loaded once at startup.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct QuizBank {
  questions: Vec<Question>,
}

impl QuizBank {
  pub fn new(questions: Vec<Question>) -> Self {
    Self { questions }
  }

  pub fn len(&self) -> usize { self.questions.len() }

  pub fn is_empty(&self) -> bool { self.questions.is_empty() }

  pub fn get(&self, idx: usize) -> Option<&Question> { self.questions.get(idx) }
}

/// Who spoke a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
  User,
  Avatar,
}

/// A single transcript entry. Avatar replies carry the id of the user turn they answer.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Turn {
  pub id: u64,
  pub speaker: Speaker,
  pub text: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub in_reply_to: Option<u64>,
}

/// Per-answer feedback emitted by the quiz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
  Correct,
  Incorrect,
}

impl Feedback {
  pub fn message(&self) -> &'static str {
    match self {
      Feedback::Correct => "✅ Correct!",
      Feedback::Incorrect => "❌ Oops! That's not right.",
    }
  }
}

/// Medal tier awarded on the Result screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MedalTier {
  ZeroGExpert,
  Silver,
  Bronze,
  NoMedal,
}

impl MedalTier {
  /// Full marks earn the expert badge, two thirds or better silver, any correct
  /// answer bronze. An empty quiz earns nothing.
  pub fn for_score(score: u32, total: u32) -> Self {
    if total > 0 && score >= total {
      MedalTier::ZeroGExpert
    } else if score == 0 {
      MedalTier::NoMedal
    } else if score * 3 >= total * 2 {
      MedalTier::Silver
    } else {
      MedalTier::Bronze
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      MedalTier::ZeroGExpert => "Zero-G Expert",
      MedalTier::Silver => "Silver Medal",
      MedalTier::Bronze => "Bronze Medal",
      MedalTier::NoMedal => "No Medal",
    }
  }

  /// Well-known image file for the tier.
  pub fn image_file(&self) -> &'static str {
    match self {
      MedalTier::ZeroGExpert => "gold.png",
      MedalTier::Silver => "silver.png",
      MedalTier::Bronze => "bronze.png",
      MedalTier::NoMedal => "fail.png",
    }
  }

  pub fn message(&self, score: u32, total: u32) -> String {
    match self {
      MedalTier::ZeroGExpert => format!("You scored {score}/{total}!\nExcellent!\nYou earned the Zero-G Expert badge! 🚀"),
      MedalTier::Silver => format!("You scored {score}/{total}.\nGreat job!\nYou earned the Silver Medal!"),
      MedalTier::Bronze => format!("You scored {score}/{total}.\nGood try!\nYou earned the Bronze Medal!"),
      MedalTier::NoMedal => format!("You scored {score}/{total}.\nTry again to earn a medal!"),
    }
  }
}
