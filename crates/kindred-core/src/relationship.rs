//! Relationship edges and the per-kind directionality policy.
//!
//! Every stored edge is an ordered pair `(person1, person2)` with a kind
//! and a kind-constrained subtype. Whether the stored order carries
//! meaning is a property of the kind, looked up through
//! [`RelationshipKind::directionality`]; no other code is allowed to
//! special-case individual kinds.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PersonId, RelationshipId};

// ─── Kind & subtype ──────────────────────────────────────────────────────────

/// The three stored edge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
  /// `person1` is the parent of `person2`.
  ParentChild,
  Spouse,
  Sibling,
}

/// Whether the stored order of an edge's endpoints carries meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directionality {
  /// `(a, b)` and `(b, a)` are distinct edges.
  Directed,
  /// `(a, b)` and `(b, a)` are the same edge.
  Undirected,
}

impl RelationshipKind {
  /// The directionality policy table. Duplicate detection and traversal
  /// both consult this, never the kind itself.
  pub fn directionality(&self) -> Directionality {
    match self {
      Self::ParentChild => Directionality::Directed,
      Self::Spouse | Self::Sibling => Directionality::Undirected,
    }
  }

  /// Whether `subtype` may be stored on an edge of this kind.
  pub fn allows(&self, subtype: RelationshipSubtype) -> bool {
    subtype.kind() == *self
  }

  /// The discriminant string stored in the `kind` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ParentChild => "parent_child",
      Self::Spouse => "spouse",
      Self::Sibling => "sibling",
    }
  }
}

impl fmt::Display for RelationshipKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The role recorded on an edge; each subtype belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipSubtype {
  // parent_child — the role of person1.
  Mother,
  Father,
  // spouse
  Husband,
  Wife,
  ExHusband,
  ExWife,
  // sibling
  Brother,
  Sister,
}

impl RelationshipSubtype {
  /// The kind this subtype belongs to.
  pub fn kind(&self) -> RelationshipKind {
    match self {
      Self::Mother | Self::Father => RelationshipKind::ParentChild,
      Self::Husband | Self::Wife | Self::ExHusband | Self::ExWife => {
        RelationshipKind::Spouse
      }
      Self::Brother | Self::Sister => RelationshipKind::Sibling,
    }
  }

  /// The discriminant string stored in the `subtype` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Mother => "mother",
      Self::Father => "father",
      Self::Husband => "husband",
      Self::Wife => "wife",
      Self::ExHusband => "ex_husband",
      Self::ExWife => "ex_wife",
      Self::Brother => "brother",
      Self::Sister => "sister",
    }
  }
}

impl fmt::Display for RelationshipSubtype {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Edge records ────────────────────────────────────────────────────────────

/// A stored edge between two persons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
  pub id:            RelationshipId,
  pub person1_id:    PersonId,
  pub person2_id:    PersonId,
  pub kind:          RelationshipKind,
  pub subtype:       RelationshipSubtype,
  /// Meaningful for `spouse` edges only.
  pub marriage_date: Option<NaiveDate>,
  pub divorce_date:  Option<NaiveDate>,
  pub is_active:     bool,
  pub created_at:    DateTime<Utc>,
}

/// Input to edge creation. `kind` and `subtype` arrive separately so a
/// mismatched pair is observable as a validation error rather than a parse
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRelationship {
  pub person1_id:    PersonId,
  pub person2_id:    PersonId,
  pub kind:          RelationshipKind,
  pub subtype:       RelationshipSubtype,
  pub marriage_date: Option<NaiveDate>,
  pub divorce_date:  Option<NaiveDate>,
}

impl NewRelationship {
  /// Convenience constructor with no dates attached.
  pub fn new(
    person1_id: PersonId,
    person2_id: PersonId,
    kind: RelationshipKind,
    subtype: RelationshipSubtype,
  ) -> Self {
    Self {
      person1_id,
      person2_id,
      kind,
      subtype,
      marriage_date: None,
      divorce_date: None,
    }
  }
}

/// Field-wise edge update; `None` leaves the stored value unchanged. Kind
/// and endpoints are immutable; replacing an edge is a delete plus a
/// create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRelationship {
  pub subtype:       Option<RelationshipSubtype>,
  pub marriage_date: Option<NaiveDate>,
  pub divorce_date:  Option<NaiveDate>,
  pub is_active:     Option<bool>,
}

/// An edge enriched with both endpoints' display names.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipView {
  pub relationship: Relationship,
  pub person1_name: String,
  pub person2_name: String,
}

/// Result of a bulk edge creation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkOutcome {
  pub created: Vec<Relationship>,
  /// Duplicate requests are dropped silently; only the count is reported.
  pub skipped: usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn directionality_policy_table() {
    assert_eq!(
      RelationshipKind::ParentChild.directionality(),
      Directionality::Directed
    );
    assert_eq!(
      RelationshipKind::Spouse.directionality(),
      Directionality::Undirected
    );
    assert_eq!(
      RelationshipKind::Sibling.directionality(),
      Directionality::Undirected
    );
  }

  #[test]
  fn every_subtype_maps_to_one_kind() {
    assert_eq!(
      RelationshipSubtype::Father.kind(),
      RelationshipKind::ParentChild
    );
    assert_eq!(RelationshipSubtype::ExWife.kind(), RelationshipKind::Spouse);
    assert_eq!(RelationshipSubtype::Sister.kind(), RelationshipKind::Sibling);
  }

  #[test]
  fn kind_rejects_foreign_subtypes() {
    assert!(RelationshipKind::ParentChild.allows(RelationshipSubtype::Mother));
    assert!(!RelationshipKind::ParentChild.allows(RelationshipSubtype::Brother));
    assert!(!RelationshipKind::Spouse.allows(RelationshipSubtype::Father));
    assert!(RelationshipKind::Sibling.allows(RelationshipSubtype::Sister));
  }
}
