//! Identifier newtypes.
//!
//! Every entity id is a UUIDv4 wrapped in its own type, so a person id can
//! never be passed where a family id is expected. The wrappers are
//! transparent for serde and format as plain hyphenated UUIDs.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
  ($(#[$doc:meta])* $name:ident) => {
    $(#[$doc])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub Uuid);

    impl $name {
      /// Generate a fresh random id.
      pub fn new() -> Self { Self(Uuid::new_v4()) }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl FromStr for $name {
      type Err = uuid::Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
      }
    }

    impl From<Uuid> for $name {
      fn from(value: Uuid) -> Self { Self(value) }
    }
  };
}

id_type!(
  /// An account id issued by the external authentication service. There is
  /// no user table in this crate; the id is carried opaquely.
  UserId
);

id_type!(PersonId);
id_type!(FamilyId);
id_type!(RelationshipId);
id_type!(PostId);
id_type!(CommentId);
