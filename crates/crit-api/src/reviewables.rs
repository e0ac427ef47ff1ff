//! Handlers for `/reviewables` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/reviewables` | Optional `?type=...&limit=...&offset=...`; profile-merged |
//! | `GET`    | `/reviewables/:type/:uri` | Aggregate + creator profile; 404 if absent |
//! | `PUT`    | `/reviewables/:type/:uri` | Owner only; metadata fields, never counters |
//! | `DELETE` | `/reviewables/:type/:uri` | Owner only |
//! | `GET`    | `/reviewables/:type/:uri/reviews` | Profile-merged reviews, newest first |
//! | `PUT`    | `/reviewables/:type/:uri/location` | Owner only |
//! | `GET`    | `/reviewables/:type/:uri/location` | `null` for non-owners |
//! | photos   | as for reviews, keyed by `:type/:uri` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use crit_core::{
  media::{Location, PhotoEntry},
  merge,
  photos,
  profile::WithProfile,
  review::{Review, ReviewableKey},
  reviewable::{Reviewable, ReviewableStatus},
  store::ReviewStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(rename = "type")]
  pub kind:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /reviewables[?type=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(_): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<WithProfile<Reviewable>>>, ApiError>
where
  S: ReviewStore,
{
  let merged = merge::list_reviewables_with_profiles(
    state.store.as_ref(),
    params.kind.as_deref(),
    params.limit,
    params.offset,
  )
  .await
  .map_err(ApiError::from_store)?;
  Ok(Json(merged))
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

/// `GET /reviewables/:type/:uri`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(_): Caller,
  Path((kind, uri)): Path<(String, String)>,
) -> Result<Json<WithProfile<Reviewable>>, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let found = merge::get_reviewable_with_profile(state.store.as_ref(), &key)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("reviewable {key} not found")))?;
  Ok(Json(found))
}

/// JSON body accepted by `PUT /reviewables/:type/:uri`. Absent fields keep
/// their stored values. The rollup counters are out of reach here; only
/// `apply_rating` touches them.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewableBody {
  pub status:     Option<ReviewableStatus>,
  pub location:   Option<Location>,
  pub categories: Option<Vec<String>>,
}

/// `PUT /reviewables/:type/:uri` — owner-conditional metadata edit.
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri)): Path<(String, String)>,
  Json(body): Json<UpdateReviewableBody>,
) -> Result<Json<Reviewable>, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let mut reviewable = state
    .store
    .find_reviewable(&key)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("reviewable {key} not found")))?;

  // The store checks the caller against the persisted owner.
  reviewable.created_by = user_id;
  if let Some(status) = body.status {
    reviewable.status = status;
  }
  if let Some(location) = body.location {
    reviewable.location = Some(location);
  }
  if let Some(categories) = body.categories {
    reviewable.categories = categories;
  }

  let reviewable = state
    .store
    .update_reviewable(reviewable)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(reviewable))
}

/// `DELETE /reviewables/:type/:uri` — owner only; never part of the review
/// write path.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  state
    .store
    .delete_reviewable(&key, &user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reviews for a target ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /reviewables/:type/:uri/reviews[?limit=...][&offset=...]`
pub async fn reviews_for<S>(
  State(state): State<AppState<S>>,
  Caller(_): Caller,
  Path((kind, uri)): Path<(String, String)>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<WithProfile<Review>>>, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let merged = merge::query_reviews_with_profiles(
    state.store.as_ref(),
    &key,
    params.limit,
    params.offset,
  )
  .await
  .map_err(ApiError::from_store)?;
  Ok(Json(merged))
}

// ─── Location ─────────────────────────────────────────────────────────────────

/// `PUT /reviewables/:type/:uri/location` — owner only.
pub async fn set_location<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri)): Path<(String, String)>,
  Json(location): Json<Location>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  photos::set_reviewable_location(state.store.as_ref(), &key, &user_id, location)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /reviewables/:type/:uri/location` — `null` unless the caller owns it.
pub async fn get_location<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri)): Path<(String, String)>,
) -> Result<Json<Option<Location>>, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let location =
    photos::get_reviewable_location(state.store.as_ref(), &key, &user_id)
      .await
      .map_err(ApiError::from_store)?;
  Ok(Json(location))
}

// ─── Photos ───────────────────────────────────────────────────────────────────

/// `POST /reviewables/:type/:uri/photos` — owner only; 201 + photo reference.
pub async fn add_photo<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri)): Path<(String, String)>,
  Json(body): Json<crate::reviews::NewPhotoBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let photo = photos::add_reviewable_photo(
    state.store.as_ref(),
    &key,
    &user_id,
    &state.config.image_bucket,
    body.media_type,
  )
  .await
  .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(photo)))
}

/// `GET /reviewables/:type/:uri/photos`
pub async fn list_photos<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri)): Path<(String, String)>,
) -> Result<Json<Vec<PhotoEntry>>, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let listed = photos::list_reviewable_photos(state.store.as_ref(), &key, &user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(listed))
}

/// `GET /reviewables/:type/:uri/photos/:photo_id`
pub async fn get_photo<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri, photo_id)): Path<(String, String, Uuid)>,
) -> Result<Json<PhotoEntry>, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  let photo =
    photos::get_reviewable_photo(state.store.as_ref(), &key, &user_id, photo_id)
      .await
      .map_err(ApiError::from_store)?
      .ok_or_else(|| ApiError::NotFound(format!("photo {photo_id} not found")))?;
  Ok(Json(photo))
}

/// `DELETE /reviewables/:type/:uri/photos/:photo_id` — owner only.
pub async fn delete_photo<S>(
  State(state): State<AppState<S>>,
  Caller(user_id): Caller,
  Path((kind, uri, photo_id)): Path<(String, String, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore,
{
  let key = ReviewableKey::new(kind, uri);
  photos::delete_reviewable_photo(state.store.as_ref(), &key, &user_id, photo_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
