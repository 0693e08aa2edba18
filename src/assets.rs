//! Image assets resolved by well-known file names under the asset directory.
//!
//! Discovery happens once at startup. Anything missing is logged and left out of
//! render messages, so the client simply draws without it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::MedalTier;

pub const CURSOR_IMAGE: &str = "final.png";
pub const AVATAR_IMAGE: &str = "kid.png";
pub const QUIZ_IMAGE: &str = "solar.png";

/// Files served from the asset directory under this URL prefix.
pub const ASSET_ROUTE: &str = "/assets";

const WELL_KNOWN: [&str; 7] = [
  CURSOR_IMAGE,
  AVATAR_IMAGE,
  QUIZ_IMAGE,
  "gold.png",
  "silver.png",
  "bronze.png",
  "fail.png",
];

#[derive(Clone, Debug, Default)]
pub struct Assets {
  dir: PathBuf,
  present: HashSet<&'static str>,
}

impl Assets {
  pub fn discover(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref().to_path_buf();
    let mut present = HashSet::new();
    for name in WELL_KNOWN {
      if dir.join(name).is_file() {
        present.insert(name);
      } else {
        warn!(target: "zerog_lesson", file = name, dir = %dir.display(), "Asset missing; rendering without it");
      }
    }
    info!(target: "zerog_lesson", found = present.len(), expected = WELL_KNOWN.len(), "Asset discovery finished");
    Self { dir, present }
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Well-known files found at startup.
  pub fn present(&self) -> impl Iterator<Item = &'static str> + '_ {
    WELL_KNOWN.into_iter().filter(|name| self.present.contains(name))
  }

  /// URL for a well-known asset, if the file was found at startup.
  pub fn url(&self, name: &str) -> Option<String> {
    self.present.contains(name).then(|| format!("{}/{}", ASSET_ROUTE, name))
  }

  pub fn medal_url(&self, tier: MedalTier) -> Option<String> {
    self.url(tier.image_file())
  }
}
