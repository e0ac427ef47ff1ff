//! Caller identity extraction.
//!
//! Token validation happens upstream (the gateway authorizer); by the time a
//! request reaches this service the verified user id travels in the
//! [`USER_ID_HEADER`] header. The extractor only checks that it is present —
//! it never validates tokens itself.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-crit-user";

/// The verified identity of the requesting user.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

impl<S> FromRequestParts<S> for Caller
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .filter(|v| !v.is_empty())
      .map(|v| Caller(v.to_owned()))
      .ok_or_else(|| {
        ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header"))
      })
  }
}
