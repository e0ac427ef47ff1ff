//! HTTP layer for Crit.
//!
//! Exposes an axum [`Router`] over the review/reviewable domain, backed by
//! any [`ReviewStore`]. Caller identity arrives pre-verified in the
//! `x-crit-user` header (see [`auth`]).

pub mod auth;
pub mod error;
pub mod reviews;
pub mod reviewables;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use crit_core::store::ReviewStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Blob-storage bucket that photo keys are minted against.
  pub image_bucket: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ReviewStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the review API.
pub fn api_router<S>(state: AppState<S>) -> Router
where
  S: ReviewStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/reviews",
      post(reviews::submit::<S>).get(reviews::list::<S>),
    )
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>)
        .put(reviews::update_one::<S>)
        .delete(reviews::delete_one::<S>),
    )
    .route(
      "/reviews/{id}/photos",
      post(reviews::add_photo::<S>).get(reviews::list_photos::<S>),
    )
    .route(
      "/reviews/{id}/photos/{photo_id}",
      get(reviews::get_photo::<S>).delete(reviews::delete_photo::<S>),
    )
    .route("/reviewables", get(reviewables::list::<S>))
    .route(
      "/reviewables/{kind}/{uri}",
      get(reviewables::get_one::<S>)
        .put(reviewables::update_one::<S>)
        .delete(reviewables::delete_one::<S>),
    )
    .route(
      "/reviewables/{kind}/{uri}/reviews",
      get(reviewables::reviews_for::<S>),
    )
    .route(
      "/reviewables/{kind}/{uri}/location",
      put(reviewables::set_location::<S>).get(reviewables::get_location::<S>),
    )
    .route(
      "/reviewables/{kind}/{uri}/photos",
      post(reviewables::add_photo::<S>).get(reviewables::list_photos::<S>),
    )
    .route(
      "/reviewables/{kind}/{uri}/photos/{photo_id}",
      get(reviewables::get_photo::<S>).delete(reviewables::delete_photo::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use crit_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::auth::USER_ID_HEADER;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:         "127.0.0.1".to_string(),
        port:         8080,
        store_path:   PathBuf::from(":memory:"),
        image_bucket: "crit-images-test".to_string(),
      }),
    }
  }

  async fn oneshot(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(USER_ID_HEADER, user);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn review_body(uri: &str, rating: u8) -> Value {
    json!({
      "type":   "restaurant",
      "uri":    uri,
      "body":   "solid",
      "rating": rating,
    })
  }

  // ── Submit / read round-trip ─────────────────────────────────────────────────

  #[tokio::test]
  async fn submit_returns_201_and_aggregate_becomes_readable() {
    let state = make_state().await;

    let resp = oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(review_body("r1", 5)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let review = json_body(resp).await;
    assert_eq!(review["user_id"], "alice");
    assert_eq!(review["rating"], 5);

    let resp = oneshot(
      state,
      "GET",
      "/reviewables/restaurant/r1",
      Some("bob"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reviewable = json_body(resp).await;
    assert_eq!(reviewable["number_of_reviews"], 1);
    assert_eq!(reviewable["cumulative_rating"], 5);
    assert_eq!(reviewable["five_star"], 1);
  }

  #[tokio::test]
  async fn two_submissions_accumulate_on_one_aggregate() {
    let state = make_state().await;

    for (user, rating) in [("alice", 5), ("bob", 3)] {
      let resp = oneshot(
        state.clone(),
        "POST",
        "/reviews",
        Some(user),
        Some(review_body("r2", rating)),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp =
      oneshot(state, "GET", "/reviewables/restaurant/r2", Some("alice"), None)
        .await;
    let reviewable = json_body(resp).await;
    assert_eq!(reviewable["number_of_reviews"], 2);
    assert_eq!(reviewable["cumulative_rating"], 8);
  }

  // ── Identity ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_user_header_returns_401() {
    let state = make_state().await;
    let resp = oneshot(
      state,
      "POST",
      "/reviews",
      None,
      Some(review_body("r3", 4)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Validation ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn out_of_range_rating_returns_400() {
    let state = make_state().await;
    for rating in [0u8, 6] {
      let resp = oneshot(
        state.clone(),
        "POST",
        "/reviews",
        Some("alice"),
        Some(review_body("r4", rating)),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "rating {rating}");
    }
  }

  #[tokio::test]
  async fn blank_target_returns_400() {
    let state = make_state().await;
    let resp = oneshot(
      state,
      "POST",
      "/reviews",
      Some("alice"),
      Some(json!({ "type": "", "uri": "", "rating": 4 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Ownership ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn deleting_another_users_review_returns_403() {
    let state = make_state().await;

    let resp = oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(review_body("r5", 4)),
    )
    .await;
    let review = json_body(resp).await;
    let id = review["review_id"].as_str().unwrap().to_string();

    let resp = oneshot(
      state.clone(),
      "DELETE",
      &format!("/reviews/{id}"),
      Some("mallory"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot(
      state,
      "DELETE",
      &format!("/reviews/{id}"),
      Some("alice"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  // ── Editing ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn review_edit_is_owner_conditional() {
    let state = make_state().await;

    let resp = oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(review_body("e1", 4)),
    )
    .await;
    let review = json_body(resp).await;
    let id = review["review_id"].as_str().unwrap().to_string();

    let resp = oneshot(
      state.clone(),
      "PUT",
      &format!("/reviews/{id}"),
      Some("mallory"),
      Some(json!({ "body": "overwritten" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot(
      state.clone(),
      "PUT",
      &format!("/reviews/{id}"),
      Some("alice"),
      Some(json!({ "body": "even better on a second visit" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let edited = json_body(resp).await;
    assert_eq!(edited["body"], "even better on a second visit");
    // Rating and target are immutable through this route.
    assert_eq!(edited["rating"], 4);
    assert_eq!(edited["uri"], "e1");

    let resp = oneshot(
      state,
      "GET",
      &format!("/reviews/{id}"),
      Some("alice"),
      None,
    )
    .await;
    let fetched = json_body(resp).await;
    assert_eq!(fetched["body"], "even better on a second visit");
  }

  #[tokio::test]
  async fn editing_an_unknown_review_returns_404() {
    let state = make_state().await;
    let resp = oneshot(
      state,
      "PUT",
      &format!("/reviews/{}", uuid::Uuid::new_v4()),
      Some("alice"),
      Some(json!({ "body": "ghost" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn reviewable_metadata_edit_is_owner_only_and_spares_counters() {
    let state = make_state().await;

    for (user, rating) in [("alice", 5), ("bob", 3)] {
      oneshot(
        state.clone(),
        "POST",
        "/reviews",
        Some(user),
        Some(review_body("e2", rating)),
      )
      .await;
    }

    // bob reviewed it, but alice created the aggregate.
    let resp = oneshot(
      state.clone(),
      "PUT",
      "/reviewables/restaurant/e2",
      Some("bob"),
      Some(json!({ "categories": ["thai"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot(
      state.clone(),
      "PUT",
      "/reviewables/restaurant/e2",
      Some("alice"),
      Some(json!({ "status": "inactive", "categories": ["thai"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let edited = json_body(resp).await;
    assert_eq!(edited["status"], "inactive");
    assert_eq!(edited["categories"], json!(["thai"]));

    let resp = oneshot(
      state,
      "GET",
      "/reviewables/restaurant/e2",
      Some("alice"),
      None,
    )
    .await;
    let fetched = json_body(resp).await;
    assert_eq!(fetched["categories"], json!(["thai"]));
    assert_eq!(fetched["number_of_reviews"], 2);
    assert_eq!(fetched["cumulative_rating"], 8);
  }

  // ── Not found ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_reviewable_returns_404() {
    let state = make_state().await;
    let resp = oneshot(
      state,
      "GET",
      "/reviewables/restaurant/nowhere",
      Some("alice"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Location gating ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn location_is_visible_to_the_owner_only() {
    let state = make_state().await;

    oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(review_body("r6", 4)),
    )
    .await;

    let resp = oneshot(
      state.clone(),
      "PUT",
      "/reviewables/restaurant/r6/location",
      Some("alice"),
      Some(json!({
        "location_name": "downtown",
        "latitude":      47.6,
        "longitude":     -122.3,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = oneshot(
      state.clone(),
      "GET",
      "/reviewables/restaurant/r6/location",
      Some("alice"),
      None,
    )
    .await;
    let location = json_body(resp).await;
    assert_eq!(location["location_name"], "downtown");

    let resp = oneshot(
      state,
      "GET",
      "/reviewables/restaurant/r6/location",
      Some("bob"),
      None,
    )
    .await;
    assert_eq!(json_body(resp).await, Value::Null);
  }

  // ── Photos over HTTP ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn review_photo_add_and_fetch() {
    let state = make_state().await;

    let resp = oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(review_body("r7", 4)),
    )
    .await;
    let review = json_body(resp).await;
    let id = review["review_id"].as_str().unwrap().to_string();

    let resp = oneshot(
      state.clone(),
      "POST",
      &format!("/reviews/{id}/photos"),
      Some("alice"),
      Some(json!({ "media_type": "image/jpeg" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let photo = json_body(resp).await;
    assert_eq!(photo["bucket"], "crit-images-test");
    let photo_id = photo["photo_id"].as_str().unwrap().to_string();

    let resp = oneshot(
      state.clone(),
      "GET",
      &format!("/reviews/{id}/photos/{photo_id}"),
      Some("alice"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Non-owners see an empty photo list, so lookups miss.
    let resp = oneshot(
      state,
      "GET",
      &format!("/reviews/{id}/photos/{photo_id}"),
      Some("bob"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Listing with profiles ────────────────────────────────────────────────────

  #[tokio::test]
  async fn reviews_for_target_carry_profile_projections() {
    let state = make_state().await;

    state
      .store
      .put_profile(crit_core::profile::Profile {
        user_id:  "alice".to_string(),
        name:     Some("Alice".to_string()),
        location: Some("Seattle".to_string()),
        email:    Some("alice@example.com".to_string()),
        phone:    None,
        photos:   Vec::new(),
      })
      .await
      .unwrap();

    oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(review_body("r8", 5)),
    )
    .await;

    let resp = oneshot(
      state,
      "GET",
      "/reviewables/restaurant/r8/reviews",
      Some("bob"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reviews = json_body(resp).await;
    let first = &reviews.as_array().unwrap()[0];
    assert_eq!(first["profile"]["name"], "Alice");
    assert_eq!(first["rating"], 5);
  }

  #[tokio::test]
  async fn reviewable_listing_filters_by_kind() {
    let state = make_state().await;

    oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(json!({ "type": "restaurant", "uri": "r9", "rating": 4 })),
    )
    .await;
    oneshot(
      state.clone(),
      "POST",
      "/reviews",
      Some("alice"),
      Some(json!({ "type": "book", "uri": "b1", "rating": 5 })),
    )
    .await;

    let resp = oneshot(
      state,
      "GET",
      "/reviewables?type=book",
      Some("alice"),
      None,
    )
    .await;
    let listed = json_body(resp).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["uri"], "b1");
  }
}
