//! Error types for `kindred-core`.

use thiserror::Error;

use crate::{
  ids::{CommentId, FamilyId, PersonId, PostId, RelationshipId},
  relationship::{RelationshipKind, RelationshipSubtype},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(PersonId),

  #[error("family not found: {0}")]
  FamilyNotFound(FamilyId),

  #[error("relationship not found: {0}")]
  RelationshipNotFound(RelationshipId),

  #[error("post not found: {0}")]
  PostNotFound(PostId),

  #[error("comment not found: {0}")]
  CommentNotFound(CommentId),

  #[error("subtype '{subtype}' is not valid for relationship kind '{kind}'")]
  InvalidSubtype {
    kind:    RelationshipKind,
    subtype: RelationshipSubtype,
  },

  #[error("relationship already exists between {0} and {1}")]
  DuplicateRelationship(PersonId, PersonId),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a storage backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
