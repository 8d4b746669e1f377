//! Family — a named grouping of persons with its own access control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{FamilyId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
  pub id:          FamilyId,
  pub name:        String,
  pub description: Option<String>,
  /// Public families are readable without a grant. Publication never
  /// confers edit rights; see [`crate::access`].
  pub is_public:   bool,
  pub created_by:  Option<UserId>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::TreeStore::add_family`]. When `created_by` is
/// set, the store issues that user an `admin` grant in the same
/// transaction as the family row.
#[derive(Debug, Clone)]
pub struct NewFamily {
  pub name:        String,
  pub description: Option<String>,
  pub is_public:   bool,
  pub created_by:  Option<UserId>,
}
