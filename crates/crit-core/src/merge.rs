//! The profile merge engine: batch-resolve the distinct owners of a list of
//! reviews/reviewables and decorate each item with a best-effort projection.

use std::collections::HashSet;

use crate::{
  profile::{ProfileProjection, WithProfile},
  review::{Review, ReviewableKey},
  reviewable::Reviewable,
  store::ReviewStore,
};

/// Anything that names the user whose profile should decorate it.
pub trait HasOwner {
  fn owner_id(&self) -> &str;
}

impl HasOwner for Review {
  fn owner_id(&self) -> &str { &self.user_id }
}

impl HasOwner for Reviewable {
  fn owner_id(&self) -> &str { &self.created_by }
}

/// Distinct owner ids in first-seen order. Duplicates are never re-fetched.
pub fn distinct_owners<'a, T, I>(items: I) -> Vec<String>
where
  T: HasOwner + 'a,
  I: IntoIterator<Item = &'a T>,
{
  let mut seen = HashSet::new();
  let mut owners = Vec::new();
  for item in items {
    let owner = item.owner_id();
    if seen.insert(owner.to_owned()) {
      owners.push(owner.to_owned());
    }
  }
  owners
}

/// Decorate every item with its owner's profile projection, preserving input
/// order and duplicates.
///
/// The distinct owner set is fetched in one logical batch; an empty input (or
/// one with no owners) performs zero store calls. A missing profile never
/// fails the batch — it yields an all-empty projection for that item.
pub async fn merge_profiles<S, T>(
  store: &S,
  items: Vec<T>,
) -> Result<Vec<WithProfile<T>>, S::Error>
where
  S: ReviewStore + ?Sized,
  T: HasOwner,
{
  let owners = distinct_owners(items.iter());
  if owners.is_empty() {
    return Ok(
      items
        .into_iter()
        .map(|item| WithProfile { item, profile: ProfileProjection::default() })
        .collect(),
    );
  }

  let profiles = store.batch_get_profiles(&owners).await?;

  Ok(
    items
      .into_iter()
      .map(|item| {
        let profile = ProfileProjection::from_profile(profiles.get(item.owner_id()));
        WithProfile { item, profile }
      })
      .collect(),
  )
}

/// Fetch one aggregate with its creator's projection attached. `None` if the
/// aggregate does not exist; a missing creator profile is a benign gap.
pub async fn get_reviewable_with_profile<S>(
  store: &S,
  key: &ReviewableKey,
) -> Result<Option<WithProfile<Reviewable>>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let Some(reviewable) = store.find_reviewable(key).await? else {
    return Ok(None);
  };
  let profile = store.get_profile(&reviewable.created_by).await?;
  Ok(Some(WithProfile {
    profile: ProfileProjection::from_profile(profile.as_ref()),
    item:    reviewable,
  }))
}

/// Reviews for one target, each decorated with its author's projection.
pub async fn query_reviews_with_profiles<S>(
  store: &S,
  key: &ReviewableKey,
  limit: Option<usize>,
  offset: Option<usize>,
) -> Result<Vec<WithProfile<Review>>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let reviews = store.query_reviews_by_target(key, limit, offset).await?;
  merge_profiles(store, reviews).await
}

/// Reviewables (optionally filtered by kind), each decorated with its
/// creator's projection.
pub async fn list_reviewables_with_profiles<S>(
  store: &S,
  kind: Option<&str>,
  limit: Option<usize>,
  offset: Option<usize>,
) -> Result<Vec<WithProfile<Reviewable>>, S::Error>
where
  S: ReviewStore + ?Sized,
{
  let reviewables = store.list_reviewables(kind, limit, offset).await?;
  merge_profiles(store, reviewables).await
}
