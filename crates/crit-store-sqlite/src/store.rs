//! [`SqliteStore`] — the SQLite implementation of [`ReviewStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crit_core::{
  error::Error as CoreError,
  profile::Profile,
  rating::Rating,
  review::{Review, ReviewableKey},
  reviewable::Reviewable,
  store::ReviewStore,
};

use crate::{
  encode::{
    encode_dt, encode_location, encode_photos, encode_status, encode_strings,
    encode_uuid, encode_uuids, RawProfile, RawReview, RawReviewable,
  },
  schema::SCHEMA,
  Error, Result,
};

const REVIEW_COLS: &str =
  "review_id, user_id, kind, uri, body, rating, photos, location, category, created_at";

const REVIEWABLE_COLS: &str = "kind, uri, created_by, created_at, status, \
   number_of_reviews, cumulative_rating, \
   one_star, two_star, three_star, four_star, five_star, \
   photos, location, categories, review_ids";

const PROFILE_COLS: &str = "user_id, name, location, email, phone, photos";

/// The original backing store returns at most this many records per batch-get
/// page; larger requests are split and re-assembled into one logical response.
const BATCH_GET_PAGE: usize = 100;

// ─── Row mapping ─────────────────────────────────────────────────────────────

fn review_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReview> {
  Ok(RawReview {
    review_id:  row.get(0)?,
    user_id:    row.get(1)?,
    kind:       row.get(2)?,
    uri:        row.get(3)?,
    body:       row.get(4)?,
    rating:     row.get(5)?,
    photos:     row.get(6)?,
    location:   row.get(7)?,
    category:   row.get(8)?,
    created_at: row.get(9)?,
  })
}

fn reviewable_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReviewable> {
  Ok(RawReviewable {
    kind:              row.get(0)?,
    uri:               row.get(1)?,
    created_by:        row.get(2)?,
    created_at:        row.get(3)?,
    status:            row.get(4)?,
    number_of_reviews: row.get(5)?,
    cumulative_rating: row.get(6)?,
    one_star:          row.get(7)?,
    two_star:          row.get(8)?,
    three_star:        row.get(9)?,
    four_star:         row.get(10)?,
    five_star:         row.get(11)?,
    photos:            row.get(12)?,
    location:          row.get(13)?,
    categories:        row.get(14)?,
    review_ids:        row.get(15)?,
  })
}

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    user_id:  row.get(0)?,
    name:     row.get(1)?,
    location: row.get(2)?,
    email:    row.get(3)?,
    phone:    row.get(4)?,
    photos:   row.get(5)?,
  })
}

fn is_constraint_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A crit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Seed or refresh a profile record. Profiles are owned by an external
  /// service; this exists for fixtures and tests.
  pub async fn put_profile(&self, profile: Profile) -> Result<()> {
    let photos_str = encode_photos(&profile.photos)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO profiles (user_id, name, location, email, phone, photos)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            profile.user_id,
            profile.name,
            profile.location,
            profile.email,
            profile.phone,
            photos_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = Error;

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn put_review(&self, review: Review) -> Result<Review> {
    let id_str       = encode_uuid(review.review_id);
    let user_id      = review.user_id.clone();
    let kind         = review.target.kind.clone();
    let uri          = review.target.uri.clone();
    let body         = review.body.clone();
    let rating       = review.rating.value() as i64;
    let photos_str   = encode_photos(&review.photos)?;
    let location_str = encode_location(&review.location)?;
    let category     = review.category.clone();
    let at_str       = encode_dt(review.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviews (
             review_id, user_id, kind, uri, body, rating,
             photos, location, category, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str, user_id, kind, uri, body, rating,
            photos_str, location_str, category, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(review)
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REVIEW_COLS} FROM reviews WHERE review_id = ?1"),
              rusqlite::params![id_str],
              review_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }

  async fn update_review(&self, review: Review) -> Result<Review> {
    let id_str       = encode_uuid(review.review_id);
    let user_id      = review.user_id.clone();
    let body         = review.body.clone();
    let photos_str   = encode_photos(&review.photos)?;
    let location_str = encode_location(&review.location)?;
    let category     = review.category.clone();

    // Single conditional statement; the rating and target never change.
    let (affected, owner): (usize, Option<String>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE reviews
           SET body = ?3, photos = ?4, location = ?5, category = ?6
           WHERE review_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_id, body, photos_str, location_str, category],
        )?;
        let owner = if n == 0 {
          conn
            .query_row(
              "SELECT user_id FROM reviews WHERE review_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?
        } else {
          None
        };
        Ok((n, owner))
      })
      .await?;

    if affected == 0 {
      return Err(match owner {
        None => CoreError::ReviewNotFound(review.review_id).into(),
        Some(_) => CoreError::NotOwner {
          caller: review.user_id.clone(),
          entity: format!("review {}", review.review_id),
        }
        .into(),
      });
    }

    Ok(review)
  }

  async fn delete_review(&self, id: Uuid, caller: &str) -> Result<()> {
    let id_str     = encode_uuid(id);
    let caller_str = caller.to_owned();

    let (affected, owner): (usize, Option<String>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM reviews WHERE review_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, caller_str],
        )?;
        let owner = if n == 0 {
          conn
            .query_row(
              "SELECT user_id FROM reviews WHERE review_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?
        } else {
          None
        };
        Ok((n, owner))
      })
      .await?;

    if affected == 0 {
      return Err(match owner {
        None => CoreError::ReviewNotFound(id).into(),
        Some(_) => CoreError::NotOwner {
          caller: caller.to_owned(),
          entity: format!("review {id}"),
        }
        .into(),
      });
    }

    Ok(())
  }

  async fn list_reviews_by_user(&self, user_id: &str) -> Result<Vec<Review>> {
    let user_id = user_id.to_owned();

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLS} FROM reviews
           WHERE user_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], review_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn query_reviews_by_target(
    &self,
    key:    &ReviewableKey,
    limit:  Option<usize>,
    offset: Option<usize>,
  ) -> Result<Vec<Review>> {
    let kind       = key.kind.clone();
    let uri        = key.uri.clone();
    let limit_val  = limit.map(|l| l as i64).unwrap_or(-1);
    let offset_val = offset.unwrap_or(0) as i64;

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLS} FROM reviews
           WHERE kind = ?1 AND uri = ?2
           ORDER BY created_at DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![kind, uri, limit_val, offset_val],
            review_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  // ── Reviewables ───────────────────────────────────────────────────────────

  async fn find_reviewable(&self, key: &ReviewableKey) -> Result<Option<Reviewable>> {
    let kind = key.kind.clone();
    let uri  = key.uri.clone();

    let raw: Option<RawReviewable> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REVIEWABLE_COLS} FROM reviewables
                 WHERE kind = ?1 AND uri = ?2"
              ),
              rusqlite::params![kind, uri],
              reviewable_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReviewable::into_reviewable).transpose()
  }

  async fn create_reviewable(&self, reviewable: Reviewable) -> Result<Reviewable> {
    let kind           = reviewable.key.kind.clone();
    let uri            = reviewable.key.uri.clone();
    let created_by     = reviewable.created_by.clone();
    let at_str         = encode_dt(reviewable.created_at);
    let status_str     = encode_status(reviewable.status).to_owned();
    let photos_str     = encode_photos(&reviewable.photos)?;
    let location_str   = encode_location(&reviewable.location)?;
    let categories_str = encode_strings(&reviewable.categories)?;
    let review_ids_str = encode_uuids(&reviewable.review_ids)?;
    let n_reviews      = reviewable.number_of_reviews as i64;
    let cumulative     = reviewable.cumulative_rating as i64;
    let stars          = reviewable.stars;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviewables (
             kind, uri, created_by, created_at, status,
             number_of_reviews, cumulative_rating,
             one_star, two_star, three_star, four_star, five_star,
             photos, location, categories, review_ids
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
          rusqlite::params![
            kind, uri, created_by, at_str, status_str,
            n_reviews, cumulative,
            stars.one_star as i64,
            stars.two_star as i64,
            stars.three_star as i64,
            stars.four_star as i64,
            stars.five_star as i64,
            photos_str, location_str, categories_str, review_ids_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        // First-writer-wins: a concurrent creation of the same natural key
        // is a conflict for the loser, who retries the whole submission.
        if is_constraint_violation(&e) {
          CoreError::ConditionFailed(format!(
            "reviewable {} already exists",
            reviewable.key,
          ))
          .into()
        } else {
          Error::Database(e)
        }
      })?;

    Ok(reviewable)
  }

  async fn apply_rating(
    &self,
    key:       &ReviewableKey,
    rating:    Rating,
    review_id: Uuid,
  ) -> Result<()> {
    let kind           = key.kind.clone();
    let uri            = key.uri.clone();
    let rating_val     = rating.value() as i64;
    let review_id_str  = encode_uuid(review_id);

    // The whole rating contribution is ONE statement: the WHERE clause
    // re-checks the natural key, every counter COALESCEs a missing value to
    // zero, and the review-id list append happens in place. No read precedes
    // the write, so concurrent reviewers cannot lose increments.
    let affected: usize = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE reviewables SET
             number_of_reviews = COALESCE(number_of_reviews, 0) + 1,
             cumulative_rating = COALESCE(cumulative_rating, 0) + ?3,
             one_star   = COALESCE(one_star, 0)   + (?3 = 1),
             two_star   = COALESCE(two_star, 0)   + (?3 = 2),
             three_star = COALESCE(three_star, 0) + (?3 = 3),
             four_star  = COALESCE(four_star, 0)  + (?3 = 4),
             five_star  = COALESCE(five_star, 0)  + (?3 = 5),
             review_ids = json_insert(COALESCE(review_ids, '[]'), '$[#]', ?4)
           WHERE kind = ?1 AND uri = ?2",
          rusqlite::params![kind, uri, rating_val, review_id_str],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      // The record resolved a moment ago is gone: the optimistic guard
      // failed, surface it as a transient conflict for the caller to retry.
      return Err(
        CoreError::ConditionFailed(format!(
          "reviewable {key} vanished during rating update"
        ))
        .into(),
      );
    }

    Ok(())
  }

  async fn update_reviewable(&self, reviewable: Reviewable) -> Result<Reviewable> {
    let kind           = reviewable.key.kind.clone();
    let uri            = reviewable.key.uri.clone();
    let created_by     = reviewable.created_by.clone();
    let status_str     = encode_status(reviewable.status).to_owned();
    let photos_str     = encode_photos(&reviewable.photos)?;
    let location_str   = encode_location(&reviewable.location)?;
    let categories_str = encode_strings(&reviewable.categories)?;

    // Metadata only — the counters belong exclusively to apply_rating, so a
    // metadata save can never clobber a concurrent rating increment.
    let (affected, owner): (usize, Option<String>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE reviewables
           SET status = ?4, photos = ?5, location = ?6, categories = ?7
           WHERE kind = ?1 AND uri = ?2 AND created_by = ?3",
          rusqlite::params![
            kind, uri, created_by, status_str,
            photos_str, location_str, categories_str,
          ],
        )?;
        let owner = if n == 0 {
          conn
            .query_row(
              "SELECT created_by FROM reviewables WHERE kind = ?1 AND uri = ?2",
              rusqlite::params![kind, uri],
              |r| r.get(0),
            )
            .optional()?
        } else {
          None
        };
        Ok((n, owner))
      })
      .await?;

    if affected == 0 {
      return Err(match owner {
        None => CoreError::ReviewableNotFound(reviewable.key.clone()).into(),
        Some(_) => CoreError::NotOwner {
          caller: reviewable.created_by.clone(),
          entity: format!("reviewable {}", reviewable.key),
        }
        .into(),
      });
    }

    Ok(reviewable)
  }

  async fn delete_reviewable(&self, key: &ReviewableKey, caller: &str) -> Result<()> {
    let kind       = key.kind.clone();
    let uri        = key.uri.clone();
    let caller_str = caller.to_owned();

    let (affected, owner): (usize, Option<String>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM reviewables WHERE kind = ?1 AND uri = ?2 AND created_by = ?3",
          rusqlite::params![kind, uri, caller_str],
        )?;
        let owner = if n == 0 {
          conn
            .query_row(
              "SELECT created_by FROM reviewables WHERE kind = ?1 AND uri = ?2",
              rusqlite::params![kind, uri],
              |r| r.get(0),
            )
            .optional()?
        } else {
          None
        };
        Ok((n, owner))
      })
      .await?;

    if affected == 0 {
      return Err(match owner {
        None => CoreError::ReviewableNotFound(key.clone()).into(),
        Some(_) => CoreError::NotOwner {
          caller: caller.to_owned(),
          entity: format!("reviewable {key}"),
        }
        .into(),
      });
    }

    Ok(())
  }

  async fn list_reviewables(
    &self,
    kind:   Option<&str>,
    limit:  Option<usize>,
    offset: Option<usize>,
  ) -> Result<Vec<Reviewable>> {
    let kind_str   = kind.map(str::to_owned);
    let limit_val  = limit.map(|l| l as i64).unwrap_or(-1);
    let offset_val = offset.unwrap_or(0) as i64;

    let raws: Vec<RawReviewable> = self
      .conn
      .call(move |conn| {
        let where_clause = if kind_str.is_some() { "WHERE kind = ?1" } else { "" };
        let sql = format!(
          "SELECT {REVIEWABLE_COLS} FROM reviewables
           {where_clause}
           ORDER BY created_at DESC
           LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![kind_str.as_deref(), limit_val, offset_val],
            reviewable_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReviewable::into_reviewable).collect()
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
    let user_id = user_id.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLS} FROM profiles WHERE user_id = ?1"),
              rusqlite::params![user_id],
              profile_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn batch_get_profiles(
    &self,
    user_ids: &[String],
  ) -> Result<HashMap<String, Profile>> {
    let mut profiles = HashMap::with_capacity(user_ids.len());

    // Paginate internally so the caller always sees one logical response.
    for chunk in user_ids.chunks(BATCH_GET_PAGE) {
      let chunk: Vec<String> = chunk.to_vec();

      let raws: Vec<RawProfile> = self
        .conn
        .call(move |conn| {
          let placeholders = vec!["?"; chunk.len()].join(", ");
          let sql = format!(
            "SELECT {PROFILE_COLS} FROM profiles WHERE user_id IN ({placeholders})"
          );
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params_from_iter(chunk.iter()), profile_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?;

      for raw in raws {
        let profile = raw.into_profile()?;
        profiles.insert(profile.user_id.clone(), profile);
      }
    }

    Ok(profiles)
  }
}
