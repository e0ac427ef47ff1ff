//! Photo attachments and geographic locations shared by reviews, reviewables,
//! and profiles.
//!
//! The core never touches image bytes; it only assigns each photo an object
//! key inside the configured blob bucket. Byte storage is a collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::ReviewableKey;

/// A photo attached to a review, reviewable, or profile. The bytes live in
/// blob storage at `bucket`/`key`; only the reference is stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
  pub photo_id:   Uuid,
  pub bucket:     Option<String>,
  pub key:        Option<String>,
  pub media_type: Option<String>,
}

/// A named geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub location_name: String,
  pub latitude:      f64,
  pub longitude:     f64,
}

/// Object key for a photo attached to a reviewable: `{kind}/{uri}/photos/{id}`.
pub fn reviewable_photo_key(key: &ReviewableKey, photo_id: Uuid) -> String {
  format!("{}/{}/photos/{}", key.kind, key.uri, photo_id)
}

/// Object key for a photo attached to a review: `{review_id}/photos/{id}`.
pub fn review_photo_key(review_id: Uuid, photo_id: Uuid) -> String {
  format!("{review_id}/photos/{photo_id}")
}
