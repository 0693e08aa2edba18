//! Encyclopedic summary client (Wikipedia REST `page/summary`).
//!
//! One GET per lookup, read-only, identified by a User-Agent. Only the `extract`
//! field of the response is used. Calls are instrumented and log topic length,
//! latency and extract size (not contents).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::config::SummaryCfg;
use crate::error::{LessonError, Result};

/// Reply used whenever the service cannot produce an extract.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't find info on that topic!";

/// Anything that can turn a topic into a short text summary.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
  async fn lookup(&self, topic: &str) -> Result<String>;
}

/// Best-effort lookup: never fails, degrades to the fallback reply.
pub async fn fetch_summary(provider: &dyn SummaryProvider, topic: &str) -> String {
  match provider.lookup(topic).await {
    Ok(text) => text,
    Err(LessonError::MissingExtract) => FALLBACK_REPLY.to_string(),
    Err(e) => {
      error!(target: "chat", error = %e, "Summary lookup failed; using fallback reply");
      format!("{} ({})", FALLBACK_REPLY, e)
    }
  }
}

#[derive(Deserialize)]
struct SummaryBody {
  #[serde(default)]
  extract: Option<String>,
}

#[derive(Clone)]
pub struct WikiSummary {
  pub client: reqwest::Client,
  pub base_url: Url,
  pub user_agent: String,
}

impl WikiSummary {
  pub fn new(cfg: &SummaryCfg) -> Result<Self> {
    let base_url = Url::parse(&cfg.base_url).map_err(|e| LessonError::Endpoint(format!("{}: {}", cfg.base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(LessonError::Endpoint(cfg.base_url.clone()));
    }
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
      .build()?;
    Ok(Self { client, base_url, user_agent: cfg.user_agent.clone() })
  }

  /// Endpoint for a topic; the topic becomes a single percent-encoded path segment.
  pub fn url_for(&self, topic: &str) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| LessonError::Endpoint(self.base_url.to_string()))?
      .pop_if_empty()
      .push(topic);
    Ok(url)
  }
}

#[async_trait]
impl SummaryProvider for WikiSummary {
  #[instrument(level = "info", skip(self, topic), fields(topic_len = topic.len()))]
  async fn lookup(&self, topic: &str) -> Result<String> {
    let url = self.url_for(topic)?;
    let start = Instant::now();

    let res = self.client
      .get(url)
      .header(USER_AGENT, &self.user_agent)
      .header(ACCEPT, "application/json")
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status();
      info!(target: "chat", %status, elapsed = ?start.elapsed(), "Summary service returned an error status");
      return Err(LessonError::Status(status));
    }

    let body = res.text().await?;
    let extract = parse_extract(&body)?;
    info!(target: "chat", elapsed = ?start.elapsed(), extract_len = extract.len(), "Summary received");
    Ok(extract)
  }
}

/// Pull the `extract` field out of a summary body. Structured decode first; a
/// body that is not valid JSON gets the plain `"extract":"…"` scan.
pub fn parse_extract(body: &str) -> Result<String> {
  let extract = match serde_json::from_str::<SummaryBody>(body) {
    Ok(parsed) => parsed.extract,
    Err(e) => match scan_extract(body) {
      Some(found) => {
        debug!(target: "chat", error = %e, "Summary body is not valid JSON; used substring scan");
        Some(found)
      }
      None => return Err(LessonError::Decode(e)),
    },
  };

  match extract {
    Some(text) if !text.trim().is_empty() => Ok(text),
    _ => Err(LessonError::MissingExtract),
  }
}

/// Substring scan for `"extract":"…"` up to the next `",`, unescaping `\n` and `\"`.
fn scan_extract(body: &str) -> Option<String> {
  const KEY: &str = "\"extract\":\"";
  let start = body.find(KEY)? + KEY.len();
  let rest = &body[start..];
  let raw = rest.find("\",").map(|end| &rest[..end]).unwrap_or(rest);
  Some(unescape_extract(raw))
}

pub fn unescape_extract(raw: &str) -> String {
  raw.replace("\\n", "\n").replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{extract::Path, http::StatusCode, routing::get, Router};

  async fn spawn_fake_wiki() -> String {
    async fn summary(Path(topic): Path<String>) -> (StatusCode, String) {
      match topic.as_str() {
        "Quasar" => (StatusCode::OK, r#"{"title":"Quasar","extract":"A quasar is an \"active\" nucleus.\nVery bright."}"#.into()),
        "Black hole" => (StatusCode::OK, r#"{"title":"Black hole","extract":"Region of spacetime."}"#.into()),
        "Empty" => (StatusCode::OK, r#"{"title":"Empty"}"#.into()),
        _ => (StatusCode::NOT_FOUND, r#"{"type":"not_found"}"#.into()),
      }
    }
    let app = Router::new().route("/page/summary/:topic", get(summary));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/page/summary", addr)
  }

  fn client(base_url: String) -> WikiSummary {
    WikiSummary::new(&SummaryCfg { base_url, ..SummaryCfg::default() }).unwrap()
  }

  #[tokio::test]
  async fn lookup_decodes_extract() {
    let wiki = client(spawn_fake_wiki().await);
    let text = wiki.lookup("Quasar").await.unwrap();
    assert_eq!(text, "A quasar is an \"active\" nucleus.\nVery bright.");
  }

  #[tokio::test]
  async fn topic_with_spaces_is_encoded_as_one_segment() {
    let wiki = client(spawn_fake_wiki().await);
    assert_eq!(wiki.lookup("Black hole").await.unwrap(), "Region of spacetime.");
    let url = wiki.url_for("a/b c").unwrap();
    assert!(url.path().ends_with("/page/summary/a%2Fb%20c"));
  }

  #[tokio::test]
  async fn missing_extract_yields_plain_fallback() {
    let wiki = client(spawn_fake_wiki().await);
    assert_eq!(fetch_summary(&wiki, "Empty").await, FALLBACK_REPLY);
  }

  #[tokio::test]
  async fn http_error_yields_fallback_with_cause() {
    let wiki = client(spawn_fake_wiki().await);
    let reply = fetch_summary(&wiki, "Nothing here").await;
    assert!(reply.starts_with(FALLBACK_REPLY));
    assert!(reply.contains("404"));
  }

  #[tokio::test]
  async fn unreachable_service_yields_fallback() {
    // port 9 (discard) on localhost is closed in test environments
    let wiki = client("http://127.0.0.1:9/page/summary".into());
    let reply = fetch_summary(&wiki, "Quasar").await;
    assert!(reply.starts_with(FALLBACK_REPLY));
  }

  #[test]
  fn scan_handles_non_json_bodies() {
    let body = r#"garbage "extract":"Line one\nsays \"hi\"","more":1"#;
    assert_eq!(parse_extract(body).unwrap(), "Line one\nsays \"hi\"");
  }

  #[test]
  fn undecodable_body_without_extract_is_a_decode_error() {
    assert!(matches!(parse_extract("<html>oops</html>"), Err(LessonError::Decode(_))));
  }

  #[test]
  fn blank_extract_counts_as_missing() {
    assert!(matches!(parse_extract(r#"{"extract":"   "}"#), Err(LessonError::MissingExtract)));
  }

  #[test]
  fn bad_base_url_is_rejected() {
    let cfg = SummaryCfg { base_url: "not a url".into(), ..SummaryCfg::default() };
    assert!(WikiSummary::new(&cfg).is_err());
  }
}
