//! The complex-review write path: persist the review, then locate-or-create
//! its aggregate and fold the rating into the rollup statistics.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  error::Error,
  rating::Rating,
  review::{NewComplexReview, Review},
  reviewable::Reviewable,
  store::ReviewStore,
};

/// Submit a complex review on behalf of `author_id` (the upstream-verified
/// caller identity — never taken from the payload).
///
/// Steps, strictly in order:
/// 1. validate the rating and target identity (no store call on failure);
/// 2. persist the review, carrying its (kind, uri) aggregate reference;
/// 3. resolve the aggregate for the target;
/// 4. apply the rating — one atomic update, or a first-writer-wins insert.
///
/// A failure after step 2 is surfaced as-is: the review stays persisted with
/// no compensating delete, and the caller retries the whole submission. The
/// retry takes the update branch, so the aggregate converges.
pub async fn submit_complex_review<S>(
  store: &S,
  author_id: &str,
  input: NewComplexReview,
) -> Result<Review, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let rating = Rating::new(input.rating)?;
  if input.target.kind.is_empty() {
    return Err(Error::MissingField("type").into());
  }
  if input.target.uri.is_empty() {
    return Err(Error::MissingField("uri").into());
  }

  let review = Review {
    review_id:  Uuid::new_v4(),
    user_id:    author_id.to_owned(),
    target:     input.target,
    body:       input.body,
    rating,
    photos:     input.photos,
    location:   input.location.clone(),
    category:   input.category,
    created_at: Utc::now(),
  };

  let review = store.put_review(review).await?;
  tracing::debug!(review_id = %review.review_id, target = %review.target, "review persisted");

  if let Err(e) =
    apply_complex_rating(store, &review, input.location, input.categories).await
  {
    // The review is already durable; the aggregate did not absorb it.
    tracing::warn!(
      review_id = %review.review_id,
      target = %review.target,
      error = %e,
      "aggregate update failed after review insert; caller should retry the submission",
    );
    return Err(e);
  }

  Ok(review)
}

/// Locate-or-create the aggregate for `review.target` and fold the rating in.
///
/// The update branch is a single atomic store operation; the create branch
/// synthesizes a first aggregate owned by the review's author. A concurrent
/// first creation for the same key surfaces as a conflict for the loser.
pub async fn apply_complex_rating<S>(
  store: &S,
  review: &Review,
  location: Option<crate::media::Location>,
  categories: Vec<String>,
) -> Result<(), S::Error>
where
  S: ReviewStore + ?Sized,
{
  match store.find_reviewable(&review.target).await? {
    Some(_) => {
      store
        .apply_rating(&review.target, review.rating, review.review_id)
        .await
    }
    None => {
      let aggregate = Reviewable::first(
        review.target.clone(),
        review.user_id.clone(),
        review.rating,
        review.review_id,
        review.created_at,
        location,
        categories,
      );
      tracing::info!(target = %aggregate.key, "creating aggregate for first review");
      store.create_reviewable(aggregate).await.map(|_| ())
    }
  }
}
