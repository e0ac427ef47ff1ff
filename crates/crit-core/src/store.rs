//! The `ReviewStore` trait — the storage abstraction for reviews,
//! reviewable aggregates, and owner profiles.
//!
//! The trait is implemented by storage backends (e.g. `crit-store-sqlite`).
//! The engines in this crate and the HTTP layer depend on this abstraction,
//! not on any concrete backend.

use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use crate::{
  error::{Error, StoreError},
  profile::Profile,
  rating::Rating,
  review::{Review, ReviewableKey},
  reviewable::Reviewable,
};

/// Abstraction over a crit storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
///
/// Write-path contracts:
/// - Owner-conditional operations (`update_review`, `delete_review`,
///   `update_reviewable`, `delete_reviewable`) must check the stored owner
///   against the caller inside the store, not read-then-write in the caller.
/// - [`ReviewStore::apply_rating`] must be ONE atomic conditional operation —
///   never a read-modify-write pair — so concurrent reviewers of the same
///   target cannot lose increments.
pub trait ReviewStore: Send + Sync {
  /// Backend error type. The `From<Error>` bound lets the engines surface
  /// core validation/ownership errors through the backend's error channel,
  /// and [`StoreError`] lets frontends classify them.
  type Error: StoreError + From<Error>;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Persist a new review unconditionally.
  fn put_review(
    &self,
    review: Review,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Replace a review, conditional on the stored owner matching
  /// `review.user_id`. Fails with a not-found or ownership error otherwise.
  fn update_review(
    &self,
    review: Review,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Delete a review, conditional on the stored owner matching `caller`.
  fn delete_review<'a>(
    &'a self,
    id: Uuid,
    caller: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn list_reviews_by_user<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + 'a;

  /// Reviews for one target, newest first, via the (kind, uri) index — an
  /// equality condition on both fields, never a scan.
  fn query_reviews_by_target<'a>(
    &'a self,
    key: &'a ReviewableKey,
    limit: Option<usize>,
    offset: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + 'a;

  // ── Reviewables ───────────────────────────────────────────────────────

  /// The aggregate resolver: at most one record per natural key, no side
  /// effects.
  fn find_reviewable<'a>(
    &'a self,
    key: &'a ReviewableKey,
  ) -> impl Future<Output = Result<Option<Reviewable>, Self::Error>> + Send + 'a;

  /// Insert a freshly synthesized aggregate. First-writer-wins: a concurrent
  /// duplicate creation surfaces as a conflict for the loser, who retries.
  fn create_reviewable(
    &self,
    reviewable: Reviewable,
  ) -> impl Future<Output = Result<Reviewable, Self::Error>> + Send + '_;

  /// The single atomic rating update: re-checks the natural key, bumps the
  /// review count, adds `rating` to the cumulative sum, bumps exactly one
  /// star bucket, and appends `review_id` — all counters defaulting absent
  /// values to zero. A stale key is a conflict, not a silent no-op.
  fn apply_rating<'a>(
    &'a self,
    key: &'a ReviewableKey,
    rating: Rating,
    review_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace an aggregate's metadata (photos, location, categories),
  /// conditional on the stored owner matching `reviewable.created_by`.
  fn update_reviewable(
    &self,
    reviewable: Reviewable,
  ) -> impl Future<Output = Result<Reviewable, Self::Error>> + Send + '_;

  /// Delete an aggregate, conditional on the stored owner matching `caller`.
  /// The review write path never deletes aggregates.
  fn delete_reviewable<'a>(
    &'a self,
    key: &'a ReviewableKey,
    caller: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn list_reviewables<'a>(
    &'a self,
    kind: Option<&'a str>,
    limit: Option<usize>,
    offset: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Reviewable>, Self::Error>> + Send + 'a;

  // ── Profiles (read-only) ──────────────────────────────────────────────

  fn get_profile<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Fetch many profiles as one logical response. A backend that cannot
  /// satisfy all keys in a single call must paginate internally. Missing
  /// profiles are simply absent from the map.
  fn batch_get_profiles<'a>(
    &'a self,
    user_ids: &'a [String],
  ) -> impl Future<Output = Result<HashMap<String, Profile>, Self::Error>> + Send + 'a;
}
