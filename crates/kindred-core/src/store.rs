//! The `TreeStore` trait and supporting types.
//!
//! Storage backends (`kindred-store-sqlite` today) implement this trait;
//! the graph engine, the permission resolver, and the API are all written
//! against it and never name a concrete backend.

use std::future::Future;

use crate::{
  family::{Family, NewFamily},
  ids::{CommentId, FamilyId, PersonId, PostId, RelationshipId, UserId},
  permission::{Grant, PermissionLevel},
  person::{NewPerson, Person, UpdatePerson},
  relationship::{
    NewRelationship, Relationship, RelationshipKind, UpdateRelationship,
  },
  social::{Comment, NewComment, NewPost, Post},
};

// ─── Insert outcome ──────────────────────────────────────────────────────────

/// Typed result of [`TreeStore::insert_relationship`].
///
/// The backend's uniqueness constraint is the authoritative duplicate
/// guard; the engine's own pre-check is only an early exit. Constraint
/// rejections therefore surface as values, not as backend errors.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
  Inserted(Relationship),
  /// The edge already exists under the per-kind directionality policy.
  Duplicate,
  /// An endpoint person no longer exists.
  MissingEndpoint,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Kindred storage backend.
///
/// Every method returns a `Send` future, so implementations drop straight
/// into a multi-threaded tokio runtime.
pub trait TreeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create and persist a new person. `id` and `created_at` are assigned
  /// by the store.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Retrieve every listed person that exists; unknown ids are silently
  /// omitted. Order is unspecified.
  fn persons_by_ids(
    &self,
    ids: Vec<PersonId>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// All persons belonging to a family, ordered by first then last name.
  fn persons_in_family(
    &self,
    family_id: FamilyId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Apply a field-wise update. Returns the updated person, or `None` if
  /// the id is unknown.
  fn update_person(
    &self,
    id: PersonId,
    update: UpdatePerson,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Delete a person and, by cascade, every edge referencing them.
  /// Returns `false` if the id was unknown.
  fn delete_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Atomically insert an edge, reporting uniqueness and foreign-key
  /// rejections as an [`InsertOutcome`] rather than an error.
  fn insert_relationship(
    &self,
    input: NewRelationship,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  fn get_relationship(
    &self,
    id: RelationshipId,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Look up an edge by its stored (ordered) endpoint pair and kind. The
  /// engine composes the two directions for undirected kinds.
  fn relationship_between(
    &self,
    person1_id: PersonId,
    person2_id: PersonId,
    kind: RelationshipKind,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Edges of `kind` where `person_id` is stored as `person1`.
  fn edges_from(
    &self,
    person_id: PersonId,
    kind: RelationshipKind,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  /// Edges of `kind` where `person_id` is stored as `person2`.
  fn edges_to(
    &self,
    person_id: PersonId,
    kind: RelationshipKind,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  /// Edges of `kind` touching `person_id` in either stored position.
  fn edges_touching(
    &self,
    person_id: PersonId,
    kind: RelationshipKind,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  /// Apply a field-wise update. Kind and endpoints are never changed.
  /// Returns `None` if the id is unknown.
  fn update_relationship(
    &self,
    id: RelationshipId,
    update: UpdateRelationship,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Delete an edge, returning the removed record, or `None` if the id
  /// was unknown.
  fn delete_relationship(
    &self,
    id: RelationshipId,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  // ── Families ──────────────────────────────────────────────────────────

  /// Create a family. When `created_by` is set, an `admin` grant for that
  /// user is written in the same transaction.
  fn add_family(
    &self,
    input: NewFamily,
  ) -> impl Future<Output = Result<Family, Self::Error>> + Send + '_;

  fn get_family(
    &self,
    id: FamilyId,
  ) -> impl Future<Output = Result<Option<Family>, Self::Error>> + Send + '_;

  /// All families, ordered by name. Visibility filtering is the caller's
  /// concern.
  fn list_families(
    &self,
  ) -> impl Future<Output = Result<Vec<Family>, Self::Error>> + Send + '_;

  /// Delete a family. Grants and posts cascade away; member persons keep
  /// their rows but lose their family reference. Returns `false` if the
  /// id was unknown.
  fn delete_family(
    &self,
    id: FamilyId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Grants ────────────────────────────────────────────────────────────

  /// The level granted to `user_id` on `family_id`, if any.
  fn grant_level(
    &self,
    user_id: UserId,
    family_id: FamilyId,
  ) -> impl Future<Output = Result<Option<PermissionLevel>, Self::Error>> + Send + '_;

  /// Insert or replace the grant for a `(user, family)` pair; at most one
  /// row per pair ever exists.
  fn upsert_grant(
    &self,
    user_id: UserId,
    family_id: FamilyId,
    level: PermissionLevel,
  ) -> impl Future<Output = Result<Grant, Self::Error>> + Send + '_;

  /// Remove a grant. Returns `false` if none existed.
  fn revoke_grant(
    &self,
    user_id: UserId,
    family_id: FamilyId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_grants(
    &self,
    family_id: FamilyId,
  ) -> impl Future<Output = Result<Vec<Grant>, Self::Error>> + Send + '_;

  // ── Posts & comments ──────────────────────────────────────────────────

  fn add_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Posts of a family, newest first. Visibility filtering is the
  /// caller's concern.
  fn posts_in_family(
    &self,
    family_id: FamilyId,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: CommentId,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Comments on a post, oldest first.
  fn comments_on_post(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;
}
