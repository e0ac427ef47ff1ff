//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields (photo
//! lists, locations, categories, review-id lists) are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use crit_core::{
  media::{Location, PhotoEntry},
  profile::Profile,
  rating::{Rating, StarBuckets},
  review::{Review, ReviewableKey},
  reviewable::{Reviewable, ReviewableStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status ───────────────────────────────────────────────────────────────────

pub fn encode_status(s: ReviewableStatus) -> &'static str {
  match s {
    ReviewableStatus::Active => "active",
    ReviewableStatus::Inactive => "inactive",
  }
}

pub fn decode_status(s: &str) -> Result<ReviewableStatus> {
  match s {
    "active" => Ok(ReviewableStatus::Active),
    "inactive" => Ok(ReviewableStatus::Inactive),
    other => Err(Error::Decode(format!("unknown reviewable status: {other:?}"))),
  }
}

// ─── JSON columns ─────────────────────────────────────────────────────────────

pub fn encode_photos(photos: &[PhotoEntry]) -> Result<String> {
  Ok(serde_json::to_string(photos)?)
}

pub fn decode_photos(s: &str) -> Result<Vec<PhotoEntry>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_location(location: &Option<Location>) -> Result<Option<String>> {
  location.as_ref().map(|l| Ok(serde_json::to_string(l)?)).transpose()
}

pub fn decode_location(s: Option<&str>) -> Result<Option<Location>> {
  s.map(|s| Ok(serde_json::from_str(s)?)).transpose()
}

pub fn encode_strings(values: &[String]) -> Result<String> {
  Ok(serde_json::to_string(values)?)
}

pub fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_uuids(ids: &[Uuid]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_uuids(s: &str) -> Result<Vec<Uuid>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// A `reviews` row as read from SQLite, before decoding.
pub struct RawReview {
  pub review_id:  String,
  pub user_id:    String,
  pub kind:       String,
  pub uri:        String,
  pub body:       String,
  pub rating:     i64,
  pub photos:     String,
  pub location:   Option<String>,
  pub category:   Option<String>,
  pub created_at: String,
}

impl RawReview {
  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id:  decode_uuid(&self.review_id)?,
      user_id:    self.user_id,
      target:     ReviewableKey { kind: self.kind, uri: self.uri },
      body:       self.body,
      rating:     Rating::new(self.rating as u8)?,
      photos:     decode_photos(&self.photos)?,
      location:   decode_location(self.location.as_deref())?,
      category:   self.category,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `reviewables` row as read from SQLite. Counter columns may be NULL on
/// rows written before the counter existed; they decode as zero.
pub struct RawReviewable {
  pub kind:              String,
  pub uri:               String,
  pub created_by:        String,
  pub created_at:        String,
  pub status:            String,
  pub number_of_reviews: i64,
  pub cumulative_rating: Option<i64>,
  pub one_star:          Option<i64>,
  pub two_star:          Option<i64>,
  pub three_star:        Option<i64>,
  pub four_star:         Option<i64>,
  pub five_star:         Option<i64>,
  pub photos:            String,
  pub location:          Option<String>,
  pub categories:        String,
  pub review_ids:        String,
}

impl RawReviewable {
  pub fn into_reviewable(self) -> Result<Reviewable> {
    Ok(Reviewable {
      key:               ReviewableKey { kind: self.kind, uri: self.uri },
      created_by:        self.created_by,
      created_at:        decode_dt(&self.created_at)?,
      status:            decode_status(&self.status)?,
      number_of_reviews: self.number_of_reviews as u64,
      cumulative_rating: self.cumulative_rating.unwrap_or(0) as u64,
      stars:             StarBuckets {
        one_star:   self.one_star.unwrap_or(0) as u64,
        two_star:   self.two_star.unwrap_or(0) as u64,
        three_star: self.three_star.unwrap_or(0) as u64,
        four_star:  self.four_star.unwrap_or(0) as u64,
        five_star:  self.five_star.unwrap_or(0) as u64,
      },
      photos:            decode_photos(&self.photos)?,
      location:          decode_location(self.location.as_deref())?,
      categories:        decode_strings(&self.categories)?,
      review_ids:        decode_uuids(&self.review_ids)?,
    })
  }
}

/// A `profiles` row as read from SQLite.
pub struct RawProfile {
  pub user_id:  String,
  pub name:     Option<String>,
  pub location: Option<String>,
  pub email:    Option<String>,
  pub phone:    Option<String>,
  pub photos:   String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:  self.user_id,
      name:     self.name,
      location: self.location,
      email:    self.email,
      phone:    self.phone,
      photos:   decode_photos(&self.photos)?,
    })
  }
}
