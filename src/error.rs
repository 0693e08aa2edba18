//! Error taxonomy for the boundaries that can fail (summary lookups, progress appends).
//!
//! None of these reach the navigation layer: the chat router turns them into the
//! fallback reply and the progress sink turns them into a log line.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LessonError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("decode error: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("no extract in response")]
  MissingExtract,

  #[error("invalid endpoint: {0}")]
  Endpoint(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LessonError>;
