//! Photo attachment and location sub-operations for reviews and reviewables.
//!
//! Writes are owner-checked and surface ownership/not-found errors; reads are
//! best-effort and collapse to `None`/empty for anything the caller does not
//! own. Deleting a photo that is already gone is a no-op.

use uuid::Uuid;

use crate::{
  error::Error,
  media::{review_photo_key, reviewable_photo_key, Location, PhotoEntry},
  review::ReviewableKey,
  store::ReviewStore,
};

// ─── Review photos ───────────────────────────────────────────────────────────

pub async fn add_review_photo<S>(
  store: &S,
  review_id: Uuid,
  caller: &str,
  bucket: &str,
  media_type: Option<String>,
) -> Result<PhotoEntry, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let mut review = store
    .get_review(review_id)
    .await?
    .ok_or(Error::ReviewNotFound(review_id))?;
  if review.user_id != caller {
    return Err(
      Error::NotOwner {
        caller: caller.to_owned(),
        entity: format!("review {review_id}"),
      }
      .into(),
    );
  }

  let photo_id = Uuid::new_v4();
  let photo = PhotoEntry {
    photo_id,
    bucket: Some(bucket.to_owned()),
    key: Some(review_photo_key(review_id, photo_id)),
    media_type,
  };
  review.photos.push(photo.clone());
  store.update_review(review).await?;
  Ok(photo)
}

pub async fn list_review_photos<S>(
  store: &S,
  review_id: Uuid,
  caller: &str,
) -> Result<Vec<PhotoEntry>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  Ok(match store.get_review(review_id).await? {
    Some(review) if review.user_id == caller => review.photos,
    _ => Vec::new(),
  })
}

pub async fn get_review_photo<S>(
  store: &S,
  review_id: Uuid,
  caller: &str,
  photo_id: Uuid,
) -> Result<Option<PhotoEntry>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let photos = list_review_photos(store, review_id, caller).await?;
  Ok(photos.into_iter().find(|p| p.photo_id == photo_id))
}

pub async fn delete_review_photo<S>(
  store: &S,
  review_id: Uuid,
  caller: &str,
  photo_id: Uuid,
) -> Result<(), S::Error>
where
  S: ReviewStore + ?Sized,
{
  let mut review = store
    .get_review(review_id)
    .await?
    .ok_or(Error::ReviewNotFound(review_id))?;
  if review.user_id != caller {
    return Err(
      Error::NotOwner {
        caller: caller.to_owned(),
        entity: format!("review {review_id}"),
      }
      .into(),
    );
  }
  review.photos.retain(|p| p.photo_id != photo_id);
  store.update_review(review).await?;
  Ok(())
}

// ─── Reviewable photos ───────────────────────────────────────────────────────

pub async fn add_reviewable_photo<S>(
  store: &S,
  key: &ReviewableKey,
  caller: &str,
  bucket: &str,
  media_type: Option<String>,
) -> Result<PhotoEntry, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let mut reviewable = store
    .find_reviewable(key)
    .await?
    .ok_or_else(|| Error::ReviewableNotFound(key.clone()))?;
  if reviewable.created_by != caller {
    return Err(
      Error::NotOwner {
        caller: caller.to_owned(),
        entity: format!("reviewable {key}"),
      }
      .into(),
    );
  }

  let photo_id = Uuid::new_v4();
  let photo = PhotoEntry {
    photo_id,
    bucket: Some(bucket.to_owned()),
    key: Some(reviewable_photo_key(key, photo_id)),
    media_type,
  };
  reviewable.photos.push(photo.clone());
  store.update_reviewable(reviewable).await?;
  Ok(photo)
}

pub async fn list_reviewable_photos<S>(
  store: &S,
  key: &ReviewableKey,
  caller: &str,
) -> Result<Vec<PhotoEntry>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  Ok(match store.find_reviewable(key).await? {
    Some(reviewable) if reviewable.created_by == caller => reviewable.photos,
    _ => Vec::new(),
  })
}

pub async fn get_reviewable_photo<S>(
  store: &S,
  key: &ReviewableKey,
  caller: &str,
  photo_id: Uuid,
) -> Result<Option<PhotoEntry>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let photos = list_reviewable_photos(store, key, caller).await?;
  Ok(photos.into_iter().find(|p| p.photo_id == photo_id))
}

pub async fn delete_reviewable_photo<S>(
  store: &S,
  key: &ReviewableKey,
  caller: &str,
  photo_id: Uuid,
) -> Result<(), S::Error>
where
  S: ReviewStore + ?Sized,
{
  let mut reviewable = store
    .find_reviewable(key)
    .await?
    .ok_or_else(|| Error::ReviewableNotFound(key.clone()))?;
  if reviewable.created_by != caller {
    return Err(
      Error::NotOwner {
        caller: caller.to_owned(),
        entity: format!("reviewable {key}"),
      }
      .into(),
    );
  }
  reviewable.photos.retain(|p| p.photo_id != photo_id);
  store.update_reviewable(reviewable).await?;
  Ok(())
}

// ─── Reviewable location ─────────────────────────────────────────────────────

pub async fn set_reviewable_location<S>(
  store: &S,
  key: &ReviewableKey,
  caller: &str,
  location: Location,
) -> Result<(), S::Error>
where
  S: ReviewStore + ?Sized,
{
  let mut reviewable = store
    .find_reviewable(key)
    .await?
    .ok_or_else(|| Error::ReviewableNotFound(key.clone()))?;
  if reviewable.created_by != caller {
    return Err(
      Error::NotOwner {
        caller: caller.to_owned(),
        entity: format!("reviewable {key}"),
      }
      .into(),
    );
  }
  reviewable.location = Some(location);
  store.update_reviewable(reviewable).await?;
  Ok(())
}

pub async fn get_reviewable_location<S>(
  store: &S,
  key: &ReviewableKey,
  caller: &str,
) -> Result<Option<Location>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  Ok(match store.find_reviewable(key).await? {
    Some(reviewable) if reviewable.created_by == caller => reviewable.location,
    _ => None,
  })
}
