//! Reviewable aggregate — the rollup of all reviews for one (kind, uri) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  media::{Location, PhotoEntry},
  rating::{Rating, StarBuckets},
  review::ReviewableKey,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewableStatus {
  #[default]
  Active,
  Inactive,
}

/// The rollup record for one reviewable subject.
///
/// Invariants, maintained by the single atomic update in the store:
/// - `stars.total() == number_of_reviews`
/// - `cumulative_rating` is the sum of all contributing ratings, so
///   `number_of_reviews <= cumulative_rating <= 5 * number_of_reviews`.
///
/// Created lazily on first review; mutated by any authenticated submitter's
/// rating; metadata edits and deletion are owner-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reviewable {
  #[serde(flatten)]
  pub key:               ReviewableKey,
  pub created_by:        String,
  pub created_at:        DateTime<Utc>,
  #[serde(default)]
  pub status:            ReviewableStatus,
  #[serde(default)]
  pub number_of_reviews: u64,
  /// Sum of all ratings, not an average; the average is derived.
  #[serde(default)]
  pub cumulative_rating: u64,
  #[serde(flatten)]
  pub stars:             StarBuckets,
  #[serde(default)]
  pub photos:            Vec<PhotoEntry>,
  pub location:          Option<Location>,
  #[serde(default)]
  pub categories:        Vec<String>,
  #[serde(default)]
  pub review_ids:        Vec<Uuid>,
}

impl Reviewable {
  /// The aggregate synthesized for the first review of a target.
  pub fn first(
    key:        ReviewableKey,
    created_by: String,
    rating:     Rating,
    review_id:  Uuid,
    created_at: DateTime<Utc>,
    location:   Option<Location>,
    categories: Vec<String>,
  ) -> Self {
    Self {
      key,
      created_by,
      created_at,
      status: ReviewableStatus::Active,
      number_of_reviews: 1,
      cumulative_rating: rating.value() as u64,
      stars: StarBuckets::seed(rating),
      photos: Vec::new(),
      location,
      categories,
      review_ids: vec![review_id],
    }
  }

  /// Derived mean rating; `None` until the first review lands.
  pub fn average_rating(&self) -> Option<f64> {
    if self.number_of_reviews == 0 {
      None
    } else {
      Some(self.cumulative_rating as f64 / self.number_of_reviews as f64)
    }
  }
}
