//! Caller-side access policy.
//!
//! Grant authorization and publication are separate dimensions: the
//! [`PermissionResolver`] only answers "does this actor hold a grant of
//! at least this level", and never reads a family's `is_public` flag.
//! The helpers here combine the two dimensions for callers that serve
//! reads, so each half stays independently testable.

use crate::{
  error::Result,
  family::Family,
  permission::{Actor, PermissionLevel, PermissionResolver},
  social::{Post, Visibility},
  store::TreeStore,
};

/// Whether `actor` may view `family`.
///
/// Public families are visible to everyone, including anonymous
/// callers. Private families require a `view` grant (or better).
pub async fn can_view_family<S: TreeStore>(
  resolver: &PermissionResolver<S>,
  actor: Option<&Actor>,
  family: &Family,
) -> Result<bool> {
  if family.is_public {
    return Ok(true);
  }
  match actor {
    Some(actor) => {
      resolver
        .has_permission(actor, family.id, PermissionLevel::View)
        .await
    }
    None => Ok(false),
  }
}

/// Whether `actor` may view `post`.
///
/// `public` posts are visible to anyone, even outside the family.
/// `family` posts require a `view` grant on the post's family, and
/// `admin` posts an `admin` grant.
pub async fn can_view_post<S: TreeStore>(
  resolver: &PermissionResolver<S>,
  actor: Option<&Actor>,
  post: &Post,
) -> Result<bool> {
  let required = match post.visibility {
    Visibility::Public => return Ok(true),
    Visibility::Family => PermissionLevel::View,
    Visibility::Admin => PermissionLevel::Admin,
  };
  match actor {
    Some(actor) => {
      resolver.has_permission(actor, post.family_id, required).await
    }
    None => Ok(false),
  }
}
