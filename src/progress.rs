//! Append-only progress log: one `<lesson> - Score: <n>` line per call.
//!
//! The file is opened per call (append + create), so there is no long-lived
//! handle to share. Failures are logged and swallowed.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

use crate::error::Result;

#[derive(Clone, Debug)]
pub struct ProgressSink {
  path: PathBuf,
}

impl ProgressSink {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Line format; lesson names are written as-is.
  pub fn format_line(lesson_name: &str, score: u32) -> String {
    format!("{} - Score: {}\n", lesson_name, score)
  }

  async fn try_append(&self, lesson_name: &str, score: u32) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .await?;
    file.write_all(Self::format_line(lesson_name, score).as_bytes()).await?;
    file.flush().await?;
    Ok(())
  }

  /// Append one line. Returns whether it was written; errors only reach the log.
  #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
  pub async fn append(&self, lesson_name: &str, score: u32) -> bool {
    match self.try_append(lesson_name, score).await {
      Ok(()) => {
        info!(target: "zerog_lesson", %lesson_name, score, "Progress saved");
        true
      }
      Err(e) => {
        error!(target: "zerog_lesson", %lesson_name, score, error = %e, "Failed to save progress");
        false
      }
    }
  }
}
