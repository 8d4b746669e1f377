//! The family permission resolver.
//!
//! One pure decision path: a global `admin` role passes every check before
//! any grant is consulted; everyone else needs a stored grant of at least
//! the required level. Public-family visibility is NOT decided here; see
//! [`crate::access`] for how callers combine the two dimensions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{FamilyId, UserId},
  store::TreeStore,
};

// ─── Levels & roles ──────────────────────────────────────────────────────────

/// Per-family permission level. The derived ordering is the authorization
/// ordering: `View < Edit < Admin`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
  View,
  Edit,
  Admin,
}

impl PermissionLevel {
  /// The discriminant string stored in the `level` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::View => "view",
      Self::Edit => "edit",
      Self::Admin => "admin",
    }
  }
}

/// Global account role, issued by the external authentication service.
/// Deliberately a separate input from [`PermissionLevel`]; the two never
/// share an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Admin,
  FamilyMember,
  Guest,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::FamilyMember => "family_member",
      Self::Guest => "guest",
    }
  }
}

/// An authenticated identity, as handed in by upstream authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id: UserId,
  pub role:    Role,
}

impl Actor {
  pub fn new(user_id: UserId, role: Role) -> Self {
    Self { user_id, role }
  }
}

/// One user's permission level on one family; unique per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
  pub user_id:    UserId,
  pub family_id:  FamilyId,
  pub level:      PermissionLevel,
  pub created_at: DateTime<Utc>,
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Decides whether an actor holds a required permission level on a family.
pub struct PermissionResolver<S> {
  store: Arc<S>,
}

impl<S: TreeStore> PermissionResolver<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// `true` if `actor` may act on `family_id` at `required` level.
  ///
  /// The global admin override is the explicit first check and bypasses
  /// the grant lookup entirely. A missing grant answers `false`, not an
  /// error; the family's `is_public` flag is never consulted.
  pub async fn has_permission(
    &self,
    actor: &Actor,
    family_id: FamilyId,
    required: PermissionLevel,
  ) -> Result<bool> {
    if actor.role == Role::Admin {
      return Ok(true);
    }

    let granted = self
      .store
      .grant_level(actor.user_id, family_id)
      .await
      .map_err(Error::store)?;

    Ok(match granted {
      Some(level) => level >= required,
      None => false,
    })
  }

  /// [`Self::has_permission`] with a `false` answer turned into
  /// [`Error::Forbidden`].
  pub async fn require(
    &self,
    actor: &Actor,
    family_id: FamilyId,
    required: PermissionLevel,
  ) -> Result<()> {
    if self.has_permission(actor, family_id, required).await? {
      Ok(())
    } else {
      Err(Error::Forbidden(format!(
        "requires {} access to family {family_id}",
        required.as_str()
      )))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn level_ordering_is_view_edit_admin() {
    assert!(PermissionLevel::View < PermissionLevel::Edit);
    assert!(PermissionLevel::Edit < PermissionLevel::Admin);
    assert!(PermissionLevel::View < PermissionLevel::Admin);
  }
}
