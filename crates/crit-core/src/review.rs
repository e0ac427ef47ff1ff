//! Review — one user's rating + commentary event targeting a reviewable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  media::{Location, PhotoEntry},
  rating::Rating,
};

// ─── Natural key ─────────────────────────────────────────────────────────────

/// The business identity of a reviewable subject: its kind (e.g.
/// `restaurant`) plus a URI. Used directly as the aggregate's storage key —
/// no synthetic id indirection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewableKey {
  #[serde(rename = "type")]
  pub kind: String,
  pub uri:  String,
}

impl ReviewableKey {
  pub fn new(kind: impl Into<String>, uri: impl Into<String>) -> Self {
    Self { kind: kind.into(), uri: uri.into() }
  }
}

impl std::fmt::Display for ReviewableKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.kind, self.uri)
  }
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A persisted review. Immutable except for its photo list; deleted only by
/// its owner.
///
/// `target` doubles as the aggregate reference: the reviewable the review was
/// merged into is keyed by the same natural key, so the linkage can never go
/// stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:  Uuid,
  pub user_id:    String,
  #[serde(flatten)]
  pub target:     ReviewableKey,
  /// Free-text commentary.
  pub body:       String,
  pub rating:     Rating,
  #[serde(default)]
  pub photos:     Vec<PhotoEntry>,
  pub location:   Option<Location>,
  pub category:   Option<String>,
  pub created_at: DateTime<Utc>,
}

// ─── Submission input ────────────────────────────────────────────────────────

/// Input to [`crate::submit::submit_complex_review`].
///
/// `rating` is accepted raw and validated before any store call. The author
/// id is never accepted from the payload; it comes from the verified caller
/// identity. `location` and `categories` seed the aggregate if this is the
/// first review for the target.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComplexReview {
  #[serde(flatten)]
  pub target:     ReviewableKey,
  #[serde(default)]
  pub body:       String,
  pub rating:     u8,
  #[serde(default)]
  pub photos:     Vec<PhotoEntry>,
  pub location:   Option<Location>,
  pub category:   Option<String>,
  #[serde(default)]
  pub categories: Vec<String>,
}
