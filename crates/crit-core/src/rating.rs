//! Ratings and the per-star counters carried by a reviewable aggregate.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A validated star rating, always in 1..=5.
///
/// Construction goes through [`Rating::new`]; an out-of-range value is a
/// validation error at the boundary, never a silently dropped bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
  pub fn new(value: u8) -> Result<Self, Error> {
    if (1..=5).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::InvalidRating(value))
    }
  }

  pub fn value(self) -> u8 { self.0 }
}

impl TryFrom<u8> for Rating {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Error> { Self::new(value) }
}

impl From<Rating> for u8 {
  fn from(r: Rating) -> u8 { r.0 }
}

impl std::fmt::Display for Rating {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Star buckets ────────────────────────────────────────────────────────────

/// The five per-star counters of an aggregate.
///
/// Invariant: the sum of all buckets equals the aggregate's review count.
/// Fields default to zero on deserialisation so aggregates written before a
/// counter existed still read (and accumulate) correctly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarBuckets {
  #[serde(default)]
  pub one_star:   u64,
  #[serde(default)]
  pub two_star:   u64,
  #[serde(default)]
  pub three_star: u64,
  #[serde(default)]
  pub four_star:  u64,
  #[serde(default)]
  pub five_star:  u64,
}

impl StarBuckets {
  /// Buckets for a first review: exactly one counter set to 1.
  pub fn seed(rating: Rating) -> Self {
    let mut buckets = Self::default();
    buckets.increment(rating);
    buckets
  }

  /// Bump the single bucket corresponding to `rating`.
  pub fn increment(&mut self, rating: Rating) {
    match rating.value() {
      1 => self.one_star += 1,
      2 => self.two_star += 1,
      3 => self.three_star += 1,
      4 => self.four_star += 1,
      _ => self.five_star += 1,
    }
  }

  pub fn count(&self, rating: Rating) -> u64 {
    match rating.value() {
      1 => self.one_star,
      2 => self.two_star,
      3 => self.three_star,
      4 => self.four_star,
      _ => self.five_star,
    }
  }

  pub fn total(&self) -> u64 {
    self.one_star + self.two_star + self.three_star + self.four_star + self.five_star
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
