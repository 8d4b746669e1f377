//! Person — a node in the family graph.
//!
//! A person record holds profile data only. Graph structure (parents,
//! spouses, siblings) lives in relationship edges and is derived on read;
//! see [`crate::engine`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{FamilyId, PersonId, UserId};

/// Recorded gender of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Other,
}

impl Gender {
  /// The discriminant string stored in the `gender` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
      Self::Other => "other",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub id:          PersonId,
  pub first_name:  String,
  pub last_name:   String,
  pub gender:      Gender,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  pub birth_place: Option<String>,
  pub death_place: Option<String>,
  pub is_deceased: bool,
  /// The family this person belongs to, if any. A person belongs to at
  /// most one family.
  pub family_id:   Option<FamilyId>,
  pub created_by:  Option<UserId>,
  pub created_at:  DateTime<Utc>,
}

impl Person {
  /// The name shown next to derived relationships.
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_string()
  }
}

/// Input to [`crate::store::TreeStore::add_person`].
/// `id` and `created_at` are always assigned by the store; `created_by` is
/// overwritten with the acting user by the service layer.
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub first_name:  String,
  pub last_name:   String,
  pub gender:      Gender,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  pub birth_place: Option<String>,
  pub death_place: Option<String>,
  pub is_deceased: bool,
  pub family_id:   Option<FamilyId>,
  pub created_by:  Option<UserId>,
}

impl NewPerson {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    gender: Gender,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      gender,
      birth_date: None,
      death_date: None,
      birth_place: None,
      death_place: None,
      is_deceased: false,
      family_id: None,
      created_by: None,
    }
  }
}

/// Field-wise profile update; `None` leaves the stored value unchanged.
/// Family membership is not part of profile editing and never changes here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePerson {
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub gender:      Option<Gender>,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  pub birth_place: Option<String>,
  pub death_place: Option<String>,
  pub is_deceased: Option<bool>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  #[test]
  fn display_name_trims_missing_last_name() {
    let person = Person {
      id:          PersonId::new(),
      first_name:  "Mononym".to_string(),
      last_name:   String::new(),
      gender:      Gender::Other,
      birth_date:  None,
      death_date:  None,
      birth_place: None,
      death_place: None,
      is_deceased: false,
      family_id:   None,
      created_by:  None,
      created_at:  Utc::now(),
    };
    assert_eq!(person.display_name(), "Mononym");
  }
}
