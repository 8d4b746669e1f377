//! Caller identity, taken from trusted request headers.
//!
//! The API expects an upstream proxy to authenticate users and forward
//! the result in two headers:
//!
//! | Header | Value |
//! |--------|-------|
//! | `x-user-id` | the caller's user id (UUID) |
//! | `x-user-role` | `admin`, `family_member` or `guest`; defaults to `guest` |
//!
//! A request without a parseable `x-user-id` is anonymous. Read endpoints
//! extract [`OptionalActor`]; endpoints that mutate or expose grant data
//! extract [`CurrentActor`] and answer `401` when no identity is present.

use std::convert::Infallible;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use kindred_core::{
  ids::UserId,
  permission::{Actor, Role},
};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller. Rejects with `401` when the request carries
/// no identity.
pub struct CurrentActor(pub Actor);

impl<St: Send + Sync> FromRequestParts<St> for CurrentActor {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    actor_from_headers(&parts.headers)
      .map(CurrentActor)
      .ok_or(ApiError::Unauthorized)
  }
}

/// The caller if authenticated, `None` for anonymous requests.
pub struct OptionalActor(pub Option<Actor>);

impl<St: Send + Sync> FromRequestParts<St> for OptionalActor {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    Ok(OptionalActor(actor_from_headers(&parts.headers)))
  }
}

/// Parse the identity headers. `None` unless `x-user-id` holds a UUID.
fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
  let id: Uuid = headers.get(USER_ID_HEADER)?.to_str().ok()?.parse().ok()?;
  let role = match headers
    .get(USER_ROLE_HEADER)
    .and_then(|v| v.to_str().ok())
  {
    Some("admin") => Role::Admin,
    Some("family_member") => Role::FamilyMember,
    _ => Role::Guest,
  };
  Some(Actor::new(UserId::from(id), role))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
      map.insert(*name, value.parse().unwrap());
    }
    map
  }

  #[test]
  fn full_identity_parses() {
    let id = Uuid::new_v4();
    let map = headers(&[
      (USER_ID_HEADER, &id.to_string()),
      (USER_ROLE_HEADER, "admin"),
    ]);
    let actor = actor_from_headers(&map).unwrap();
    assert_eq!(actor.user_id, UserId::from(id));
    assert_eq!(actor.role, Role::Admin);
  }

  #[test]
  fn missing_role_defaults_to_guest() {
    let map = headers(&[(USER_ID_HEADER, &Uuid::new_v4().to_string())]);
    assert_eq!(actor_from_headers(&map).unwrap().role, Role::Guest);
  }

  #[test]
  fn unknown_role_defaults_to_guest() {
    let map = headers(&[
      (USER_ID_HEADER, &Uuid::new_v4().to_string()),
      (USER_ROLE_HEADER, "sovereign"),
    ]);
    assert_eq!(actor_from_headers(&map).unwrap().role, Role::Guest);
  }

  #[test]
  fn bad_or_missing_user_id_is_anonymous() {
    assert!(actor_from_headers(&headers(&[])).is_none());
    let map = headers(&[(USER_ID_HEADER, "not-a-uuid")]);
    assert!(actor_from_headers(&map).is_none());
  }
}
