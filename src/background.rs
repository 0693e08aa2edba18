//! Animated starfield: twinkling stars and drifting comets.
//!
//! Pure model; the session loop calls `tick` on its animation timer and the client
//! draws the frame it receives. Missed ticks are simply skipped.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const MIN_BRIGHTNESS: f32 = 0.55;
const MAX_BRIGHTNESS: f32 = 1.0;
/// How far a comet may leave the viewport before it respawns.
const COMET_MARGIN: f32 = 40.0;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Star {
  pub x: f32,
  pub y: f32,
  pub size: u8,
  pub brightness: f32,
  #[serde(skip)]
  d_brightness: f32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Comet {
  pub x: f32,
  pub y: f32,
  pub dx: f32,
  pub dy: f32,
  pub length: u32,
  pub tail_alpha: u8,
  /// RGB; comets are warm yellow-white.
  pub color: [u8; 3],
}

/// Snapshot sent to clients.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Frame {
  pub width: u32,
  pub height: u32,
  pub stars: Vec<Star>,
  pub comets: Vec<Comet>,
}

pub struct Background {
  width: u32,
  height: u32,
  stars: Vec<Star>,
  comets: Vec<Comet>,
  rng: StdRng,
}

impl Background {
  pub fn new(star_count: usize, comet_count: usize, width: u32, height: u32) -> Self {
    Self::with_rng(star_count, comet_count, width, height, StdRng::from_entropy())
  }

  pub fn with_rng(star_count: usize, comet_count: usize, width: u32, height: u32, mut rng: StdRng) -> Self {
    let (w, h) = (width.max(1), height.max(2));
    let stars = (0..star_count)
      .map(|_| Star {
        x: rng.gen::<f32>() * w as f32,
        y: rng.gen::<f32>() * h as f32,
        size: rng.gen_range(1..=3),
        brightness: 0.6 + 0.4 * rng.gen::<f32>(),
        d_brightness: 0.008 * (rng.gen::<f32>() - 0.5),
      })
      .collect();
    let comets = (0..comet_count).map(|_| make_comet(&mut rng, w, h)).collect();
    Self { width: w, height: h, stars, comets, rng }
  }

  /// Advance one animation step.
  pub fn tick(&mut self) {
    for s in &mut self.stars {
      s.brightness += s.d_brightness;
      if s.brightness > MAX_BRIGHTNESS {
        s.brightness = MAX_BRIGHTNESS;
        s.d_brightness = -s.d_brightness;
      } else if s.brightness < MIN_BRIGHTNESS {
        s.brightness = MIN_BRIGHTNESS;
        s.d_brightness = -s.d_brightness;
      }
    }

    let (w, h) = (self.width, self.height);
    for c in &mut self.comets {
      c.x += c.dx;
      c.y += c.dy;
      if c.x > w as f32 + COMET_MARGIN || c.y > h as f32 + COMET_MARGIN {
        let mut fresh = make_comet(&mut self.rng, w, h);
        fresh.x = -COMET_MARGIN;
        fresh.y = self.rng.gen_range(0..(h / 2).max(1)) as f32;
        *c = fresh;
      }
    }
  }

  /// Viewport changed: re-scatter stars and respawn comets.
  pub fn resize(&mut self, width: u32, height: u32) {
    let (w, h) = (width.max(1), height.max(2));
    self.width = w;
    self.height = h;
    for s in &mut self.stars {
      s.x = self.rng.gen::<f32>() * w as f32;
      s.y = self.rng.gen::<f32>() * h as f32;
    }
    for c in &mut self.comets {
      *c = make_comet(&mut self.rng, w, h);
    }
  }

  pub fn frame(&self) -> Frame {
    Frame { width: self.width, height: self.height, stars: self.stars.clone(), comets: self.comets.clone() }
  }

  #[cfg(test)]
  pub fn star_count(&self) -> usize { self.stars.len() }

  #[cfg(test)]
  pub fn comet_count(&self) -> usize { self.comets.len() }
}

fn make_comet(rng: &mut StdRng, w: u32, h: u32) -> Comet {
  let angle = PI / 4.0 + rng.gen::<f32>() * PI / 3.0;
  let speed = 5.0 + rng.gen::<f32>() * 4.0;
  Comet {
    x: rng.gen_range(0..w.max(1)) as f32,
    y: rng.gen_range(0..(h / 2).max(1)) as f32,
    dx: speed * angle.cos(),
    dy: speed * angle.sin(),
    length: rng.gen_range(60..110),
    tail_alpha: rng.gen_range(60..140),
    color: [255, 255, rng.gen_range(80..170)],
  }
}
