//! Error types for `crit-core`, plus the [`StoreError`] classification trait
//! that lets frontends map any backend's error onto the same taxonomy.

use thiserror::Error;
use uuid::Uuid;

use crate::review::ReviewableKey;

#[derive(Debug, Error)]
pub enum Error {
  /// A rating outside 1..=5. Caller's fault; never reaches the store.
  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(u8),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("review not found: {0}")]
  ReviewNotFound(Uuid),

  #[error("reviewable not found: {0}")]
  ReviewableNotFound(ReviewableKey),

  #[error("caller {caller} does not own {entity}")]
  NotOwner { caller: String, entity: String },

  /// A conditional/atomic store operation found its precondition no longer
  /// true (e.g. a concurrent mutation raced). Not retried here; callers are
  /// expected to retry the whole submission.
  #[error("store precondition failed: {0}")]
  ConditionFailed(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Broad failure classes, mirroring how the HTTP layer reports errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed input; the caller must fix the request.
  Validation,
  /// The stored owner does not match the caller.
  Ownership,
  NotFound,
  /// An atomic precondition did not hold; the operation may be retried.
  Conflict,
  /// Underlying store I/O failure.
  Store,
}

/// Implemented by every store backend's error type so that generic callers
/// (and the API layer) can classify failures without downcasting.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidRating(_) | Self::MissingField(_) => ErrorKind::Validation,
      Self::NotOwner { .. } => ErrorKind::Ownership,
      Self::ReviewNotFound(_) | Self::ReviewableNotFound(_) => {
        ErrorKind::NotFound
      }
      Self::ConditionFailed(_) => ErrorKind::Conflict,
      Self::Serialization(_) => ErrorKind::Store,
    }
  }
}
