//! Handlers for `/reviews` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/reviews` | Body: [`NewComplexReview`]; 201 + stored review |
//! | `GET`    | `/reviews` | The caller's own reviews |
//! | `GET`    | `/reviews/:id` | 404 if not found |
//! | `PUT`    | `/reviews/:id` | Owner only; rating and target never change |
//! | `DELETE` | `/reviews/:id` | Owner only |
//! | `POST`   | `/reviews/:id/photos` | Owner only; 201 + photo reference |
//! | `GET`    | `/reviews/:id/photos` | Empty for non-owners |
//! | `GET`    | `/reviews/:id/photos/:photo_id` | 404 if absent/not owned |
//! | `DELETE` | `/reviews/:id/photos/:photo_id` | Owner only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use crit_core::{
  media::{Location, PhotoEntry},
  photos,
  review::{NewComplexReview, Review},
  store::ReviewStore,
  submit::submit_complex_review,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── Submit ───────────────────────────────────────────────────────────────────

/// `POST /reviews` — the complex-review write path.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Json(body): Json<NewComplexReview>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  let review = submit_complex_review(state.store.as_ref(), &user_id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(review)))
}

// ─── List / get / delete ──────────────────────────────────────────────────────

/// `GET /reviews` — the caller's own reviews, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
) -> Result<Json<Vec<Review>>, ApiError>
where
  S: ReviewStore,
{
  let reviews = state
    .store
    .list_reviews_by_user(&user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(reviews))
}

/// `GET /reviews/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(_): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError>
where
  S: ReviewStore,
{
  let review = state
    .store
    .get_review(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;
  Ok(Json(review))
}

/// JSON body accepted by `PUT /reviews/:id`. Absent fields keep their stored
/// values; the rating and target are immutable after submission.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewBody {
  pub body:     Option<String>,
  pub location: Option<Location>,
  pub category: Option<String>,
}

/// `PUT /reviews/:id` — owner-conditional edit of the commentary fields.
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateReviewBody>,
) -> Result<Json<Review>, ApiError>
where
  S: ReviewStore,
{
  let mut review = state
    .store
    .get_review(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;

  // The store checks the caller against the persisted owner.
  review.user_id = user_id;
  if let Some(text) = body.body {
    review.body = text;
  }
  if let Some(location) = body.location {
    review.location = Some(location);
  }
  if let Some(category) = body.category {
    review.category = Some(category);
  }

  let review = state
    .store
    .update_review(review)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(review))
}

/// `DELETE /reviews/:id` — owner only.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore,
{
  state
    .store
    .delete_review(id, &user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Photos ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reviews/:id/photos`.
#[derive(Debug, Deserialize)]
pub struct NewPhotoBody {
  pub media_type: Option<String>,
}

/// `POST /reviews/:id/photos` — returns 201 + the photo reference. The bytes
/// are uploaded to blob storage separately, at the returned key.
pub async fn add_photo<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<NewPhotoBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  let photo = photos::add_review_photo(
    state.store.as_ref(),
    id,
    &user_id,
    &state.config.image_bucket,
    body.media_type,
  )
  .await
  .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(photo)))
}

/// `GET /reviews/:id/photos`
pub async fn list_photos<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PhotoEntry>>, ApiError>
where
  S: ReviewStore,
{
  let listed = photos::list_review_photos(state.store.as_ref(), id, &user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(listed))
}

/// `GET /reviews/:id/photos/:photo_id`
pub async fn get_photo<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PhotoEntry>, ApiError>
where
  S: ReviewStore,
{
  let photo = photos::get_review_photo(state.store.as_ref(), id, &user_id, photo_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("photo {photo_id} not found")))?;
  Ok(Json(photo))
}

/// `DELETE /reviews/:id/photos/:photo_id` — owner only.
pub async fn delete_photo<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore,
{
  photos::delete_review_photo(state.store.as_ref(), id, &user_id, photo_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
