//! Loading runtime configuration (server, logging, summary service, content) from TOML.
//!
//! The file lives at a well-known path in the working directory. Every section and
//! field is optional; a missing or broken file leaves the built-in defaults in place.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{Question, QuizBank, OPTION_COUNT};
use crate::knowledge::Rule;
use crate::seeds::{seed_dialogue, seed_lesson, seed_quiz_bank, seed_rules, LessonContent};

pub const CONFIG_PATH: &str = "zerog.toml";

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct LessonConfig {
  pub server: ServerCfg,
  pub log: LogCfg,
  pub summary: SummaryCfg,
  pub progress: ProgressCfg,
  pub assets: AssetsCfg,
  pub animation: AnimationCfg,
  /// Content overrides; `None` keeps the built-in content.
  pub dialogue: Option<Vec<String>>,
  pub lesson: Option<LessonContent>,
  pub questions: Option<Vec<QuestionCfg>>,
  pub knowledge: Option<Vec<Rule>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
  pub bind: String,
}
impl Default for ServerCfg {
  fn default() -> Self { Self { bind: "127.0.0.1:3000".into() } }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LogCfg {
  /// tracing filter directives, e.g. "info,quiz=debug"
  pub level: String,
  /// "pretty" (default) or "json"
  pub format: String,
}
impl Default for LogCfg {
  fn default() -> Self {
    Self {
      level: "info,zerog_lesson=debug,nav=debug,quiz=debug,chat=debug,tower_http=info,axum=info".into(),
      format: "pretty".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SummaryCfg {
  pub base_url: String,
  pub user_agent: String,
  pub timeout_secs: u64,
}
impl Default for SummaryCfg {
  fn default() -> Self {
    Self {
      base_url: "https://en.wikipedia.org/api/rest_v1/page/summary".into(),
      user_agent: "ZeroGravityLessonApp/1.0".into(),
      timeout_secs: 10,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProgressCfg {
  pub path: String,
  pub lesson_name: String,
}
impl Default for ProgressCfg {
  fn default() -> Self {
    Self { path: "progress.txt".into(), lesson_name: "Zero Gravity".into() }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AssetsCfg {
  /// Where the well-known images live. Only those files are served.
  pub dir: String,
  /// Browser client files, served at `/`.
  pub client_dir: String,
}
impl Default for AssetsCfg {
  fn default() -> Self { Self { dir: ".".into(), client_dir: "static".into() } }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnimationCfg {
  /// 0 disables the background ticker.
  pub interval_ms: u64,
  pub width: u32,
  pub height: u32,
}
impl Default for AnimationCfg {
  fn default() -> Self { Self { interval_ms: 40, width: 1000, height: 700 } }
}

/// Question entry accepted in TOML. Validated into a `Question` on load.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub prompt: String,
  pub options: Vec<String>,
  pub correct: usize,
}

impl QuestionCfg {
  fn validate(self) -> Option<Question> {
    if self.correct >= OPTION_COUNT {
      error!(target: "quiz", prompt = %self.prompt, correct = self.correct, "Skipping question: correct index out of range");
      return None;
    }
    let options: [String; OPTION_COUNT] = match self.options.try_into() {
      Ok(opts) => opts,
      Err(opts) => {
        let opts: Vec<String> = opts;
        error!(target: "quiz", prompt = %self.prompt, count = opts.len(), "Skipping question: needs exactly four options");
        return None;
      }
    };
    Some(Question { prompt: self.prompt, options, correct: self.correct })
  }
}

impl LessonConfig {
  pub fn quiz_bank(&self) -> QuizBank {
    match &self.questions {
      Some(list) => QuizBank::new(list.iter().cloned().filter_map(QuestionCfg::validate).collect()),
      None => seed_quiz_bank(),
    }
  }

  pub fn dialogue(&self) -> Vec<String> {
    match &self.dialogue {
      Some(lines) if !lines.is_empty() => lines.clone(),
      Some(_) => {
        warn!(target: "zerog_lesson", "Configured dialogue is empty; using built-in script");
        seed_dialogue()
      }
      None => seed_dialogue(),
    }
  }

  pub fn lesson(&self) -> LessonContent {
    self.lesson.clone().unwrap_or_else(seed_lesson)
  }

  pub fn rules(&self) -> Vec<Rule> {
    self.knowledge.clone().unwrap_or_else(seed_rules)
  }
}

/// Load `LessonConfig` from `path`. Missing file or any IO/parse error yields defaults.
pub fn load_config(path: impl AsRef<Path>) -> LessonConfig {
  let path = path.as_ref();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<LessonConfig>(&s) {
      Ok(cfg) => {
        info!(target: "zerog_lesson", path = %path.display(), "Loaded config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "zerog_lesson", path = %path.display(), error = %e, "Failed to parse TOML config; using defaults");
        LessonConfig::default()
      }
    },
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      info!(target: "zerog_lesson", path = %path.display(), "No config file; using defaults");
      LessonConfig::default()
    }
    Err(e) => {
      error!(target: "zerog_lesson", path = %path.display(), error = %e, "Failed to read TOML config file; using defaults");
      LessonConfig::default()
    }
  }
}
