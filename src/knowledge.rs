//! Keyword knowledge base for the chat avatar.
//!
//! Rules are evaluated in declaration order against lower-cased input; the
//! first rule with any matching keyword answers. No match means the caller
//! should look the topic up in the summary service.

use serde::Deserialize;

/// One keyword rule: matches when the normalized input contains any keyword.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Rule {
  pub any_of: Vec<String>,
  pub response: String,
}

impl Rule {
  pub fn new(any_of: &[&str], response: &str) -> Self {
    Self {
      any_of: any_of.iter().map(|k| k.to_lowercase()).collect(),
      response: response.into(),
    }
  }

  pub fn matches(&self, normalized: &str) -> bool {
    self.any_of.iter().any(|k| !k.is_empty() && normalized.contains(k.as_str()))
  }
}

/// Routing decision for one utterance.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
  Canned(&'a str),
  Lookup,
}

#[derive(Clone, Debug)]
pub struct KnowledgeBase {
  rules: Vec<Rule>,
}

impl KnowledgeBase {
  pub fn new(rules: Vec<Rule>) -> Self {
    let rules = rules
      .into_iter()
      .map(|r| Rule { any_of: r.any_of.into_iter().map(|k| k.to_lowercase()).collect(), response: r.response })
      .collect();
    Self { rules }
  }

  pub fn len(&self) -> usize { self.rules.len() }

  /// `normalized` must already be lower-cased.
  pub fn route(&self, normalized: &str) -> Route<'_> {
    self.rules
      .iter()
      .find(|r| r.matches(normalized))
      .map(|r| Route::Canned(r.response.as_str()))
      .unwrap_or(Route::Lookup)
  }
}
