//! Owner profiles (read-only collaborator data) and the best-effort
//! projection attached to reviews and reviewables on read.

use serde::{Deserialize, Serialize};

use crate::media::PhotoEntry;

/// A profile record as stored by the (external) profile service.
/// Every field beyond the id is optional; the core treats a missing profile —
/// or any missing sub-field — as a benign gap, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:  String,
  pub name:     Option<String>,
  pub location: Option<String>,
  pub email:    Option<String>,
  pub phone:    Option<String>,
  #[serde(default)]
  pub photos:   Vec<PhotoEntry>,
}

/// What read paths expose about an item's owner. Name and location collapse
/// to the empty string when absent; email and phone stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileProjection {
  pub name:          String,
  pub location:      String,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub profile_photo: Option<PhotoEntry>,
}

impl ProfileProjection {
  pub fn from_profile(profile: Option<&Profile>) -> Self {
    let Some(p) = profile else {
      return Self::default();
    };
    Self {
      name:          p.name.clone().unwrap_or_default(),
      location:      p.location.clone().unwrap_or_default(),
      email:         p.email.clone(),
      phone:         p.phone.clone(),
      profile_photo: p.photos.first().cloned(),
    }
  }
}

/// An item decorated with its owner's projection.
#[derive(Debug, Clone, Serialize)]
pub struct WithProfile<T> {
  #[serde(flatten)]
  pub item:    T,
  pub profile: ProfileProjection,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_profile_yields_empty_projection() {
    let proj = ProfileProjection::from_profile(None);
    assert_eq!(proj.name, "");
    assert_eq!(proj.location, "");
    assert!(proj.email.is_none());
    assert!(proj.phone.is_none());
    assert!(proj.profile_photo.is_none());
  }

  #[test]
  fn partial_profile_fills_what_it_has() {
    let profile = Profile {
      user_id:  "u1".into(),
      name:     Some("Ada".into()),
      location: None,
      email:    Some("ada@example.com".into()),
      phone:    None,
      photos:   Vec::new(),
    };
    let proj = ProfileProjection::from_profile(Some(&profile));
    assert_eq!(proj.name, "Ada");
    assert_eq!(proj.location, "");
    assert_eq!(proj.email.as_deref(), Some("ada@example.com"));
    assert!(proj.profile_photo.is_none());
  }
}
