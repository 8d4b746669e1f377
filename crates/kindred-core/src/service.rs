//! The application service.
//!
//! [`TreeService`] is the one entry point callers (the HTTP API, tests)
//! go through. It owns the permission checks and composes the graph
//! engine, the permission resolver, and the access policy; the engine
//! and resolver themselves stay authorization- and publication-blind
//! respectively.
//!
//! Mutating operations take an authenticated [`Actor`]; read operations
//! take `Option<&Actor>` so anonymous callers can reach public data.

use std::sync::Arc;

use crate::{
  Error, Result, access,
  engine::GraphEngine,
  family::{Family, NewFamily},
  ids::{FamilyId, PersonId, PostId, RelationshipId, UserId},
  permission::{Actor, Grant, PermissionLevel, PermissionResolver, Role},
  person::{NewPerson, Person, UpdatePerson},
  relationship::{
    BulkOutcome, NewRelationship, Relationship, RelationshipView,
    UpdateRelationship,
  },
  social::{Comment, NewComment, NewPost, Post},
  store::TreeStore,
};

pub struct TreeService<S> {
  store:    Arc<S>,
  engine:   GraphEngine<S>,
  resolver: PermissionResolver<S>,
}

impl<S: TreeStore> TreeService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      engine: GraphEngine::new(store.clone()),
      resolver: PermissionResolver::new(store.clone()),
      store,
    }
  }

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create a person. Placing them into a family needs `edit` on that
  /// family; a person without a family needs no grant at all.
  pub async fn create_person(
    &self,
    actor: &Actor,
    mut input: NewPerson,
  ) -> Result<Person> {
    if let Some(family_id) = input.family_id {
      self.require_family(family_id).await?;
      self
        .resolver
        .require(actor, family_id, PermissionLevel::Edit)
        .await?;
    }
    input.created_by = Some(actor.user_id);
    self.store.add_person(input).await.map_err(Error::store)
  }

  pub async fn person(
    &self,
    actor: Option<&Actor>,
    id: PersonId,
  ) -> Result<Person> {
    self.require_viewable_person(actor, id).await
  }

  pub async fn update_person(
    &self,
    actor: &Actor,
    id: PersonId,
    update: UpdatePerson,
  ) -> Result<Person> {
    let person = self.require_person(id).await?;
    self.require_person_edit(actor, &person).await?;
    self
      .store
      .update_person(id, update)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(id))
  }

  /// Delete a person. Their relationship edges go with them.
  pub async fn delete_person(
    &self,
    actor: &Actor,
    id: PersonId,
  ) -> Result<()> {
    let person = self.require_person(id).await?;
    self.require_person_edit(actor, &person).await?;
    if self.store.delete_person(id).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::PersonNotFound(id))
    }
  }

  pub async fn family_members(
    &self,
    actor: Option<&Actor>,
    family_id: FamilyId,
  ) -> Result<Vec<Person>> {
    let family = self.require_family(family_id).await?;
    self.require_family_view(actor, &family).await?;
    self
      .store
      .persons_in_family(family_id)
      .await
      .map_err(Error::store)
  }

  // ── Relationships ─────────────────────────────────────────────────────

  /// Create an edge. Requires `edit` on every family an endpoint belongs
  /// to; endpoints without a family add no requirement.
  pub async fn create_relationship(
    &self,
    actor: &Actor,
    input: NewRelationship,
  ) -> Result<RelationshipView> {
    self
      .require_endpoint_edit(actor, &[input.person1_id, input.person2_id])
      .await?;
    self.engine.create_edge(input).await
  }

  /// Create a batch of edges under [`GraphEngine::create_bulk`]
  /// semantics. The `edit` requirement covers every family any endpoint
  /// in the batch belongs to.
  pub async fn create_bulk(
    &self,
    actor: &Actor,
    inputs: Vec<NewRelationship>,
  ) -> Result<BulkOutcome> {
    let mut endpoint_ids: Vec<PersonId> = Vec::new();
    for input in &inputs {
      for id in [input.person1_id, input.person2_id] {
        if !endpoint_ids.contains(&id) {
          endpoint_ids.push(id);
        }
      }
    }
    self.require_endpoint_edit(actor, &endpoint_ids).await?;
    self.engine.create_bulk(inputs).await
  }

  pub async fn update_relationship(
    &self,
    actor: &Actor,
    id: RelationshipId,
    update: UpdateRelationship,
  ) -> Result<Relationship> {
    let edge = self.require_relationship(id).await?;
    self
      .require_endpoint_edit(actor, &[edge.person1_id, edge.person2_id])
      .await?;
    self.engine.update_edge(id, update).await
  }

  pub async fn delete_relationship(
    &self,
    actor: &Actor,
    id: RelationshipId,
  ) -> Result<Relationship> {
    let edge = self.require_relationship(id).await?;
    self
      .require_endpoint_edit(actor, &[edge.person1_id, edge.person2_id])
      .await?;
    self.engine.delete_edge(id).await
  }

  // ── Derived views ─────────────────────────────────────────────────────

  pub async fn parents(
    &self,
    actor: Option<&Actor>,
    id: PersonId,
  ) -> Result<Vec<Person>> {
    self.require_viewable_person(actor, id).await?;
    self.engine.parents_of(id).await
  }

  pub async fn children(
    &self,
    actor: Option<&Actor>,
    id: PersonId,
  ) -> Result<Vec<Person>> {
    self.require_viewable_person(actor, id).await?;
    self.engine.children_of(id).await
  }

  pub async fn spouses(
    &self,
    actor: Option<&Actor>,
    id: PersonId,
  ) -> Result<Vec<Person>> {
    self.require_viewable_person(actor, id).await?;
    self.engine.spouses_of(id).await
  }

  pub async fn siblings(
    &self,
    actor: Option<&Actor>,
    id: PersonId,
  ) -> Result<Vec<Person>> {
    self.require_viewable_person(actor, id).await?;
    self.engine.siblings_of(id).await
  }

  // ── Families ──────────────────────────────────────────────────────────

  /// Create a family. Any authenticated user may; the creator receives an
  /// `admin` grant in the same store transaction.
  pub async fn create_family(
    &self,
    actor: &Actor,
    mut input: NewFamily,
  ) -> Result<Family> {
    input.created_by = Some(actor.user_id);
    self.store.add_family(input).await.map_err(Error::store)
  }

  pub async fn family(
    &self,
    actor: Option<&Actor>,
    id: FamilyId,
  ) -> Result<Family> {
    let family = self.require_family(id).await?;
    self.require_family_view(actor, &family).await?;
    Ok(family)
  }

  /// Every family the actor may view.
  pub async fn families(&self, actor: Option<&Actor>) -> Result<Vec<Family>> {
    let mut visible = Vec::new();
    for family in self.store.list_families().await.map_err(Error::store)? {
      if access::can_view_family(&self.resolver, actor, &family).await? {
        visible.push(family);
      }
    }
    Ok(visible)
  }

  pub async fn delete_family(
    &self,
    actor: &Actor,
    id: FamilyId,
  ) -> Result<()> {
    self.require_family(id).await?;
    self
      .resolver
      .require(actor, id, PermissionLevel::Admin)
      .await?;
    if self.store.delete_family(id).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::FamilyNotFound(id))
    }
  }

  // ── Grants ────────────────────────────────────────────────────────────

  /// Set a user's permission level on a family, replacing any existing
  /// grant. Requires `admin` on the family.
  pub async fn set_permission(
    &self,
    actor: &Actor,
    family_id: FamilyId,
    user_id: UserId,
    level: PermissionLevel,
  ) -> Result<Grant> {
    self.require_family(family_id).await?;
    self
      .resolver
      .require(actor, family_id, PermissionLevel::Admin)
      .await?;
    self
      .store
      .upsert_grant(user_id, family_id, level)
      .await
      .map_err(Error::store)
  }

  /// Revoke a user's grant. Revoking an absent grant is a no-op.
  pub async fn remove_member(
    &self,
    actor: &Actor,
    family_id: FamilyId,
    user_id: UserId,
  ) -> Result<()> {
    self.require_family(family_id).await?;
    self
      .resolver
      .require(actor, family_id, PermissionLevel::Admin)
      .await?;
    self
      .store
      .revoke_grant(user_id, family_id)
      .await
      .map_err(Error::store)?;
    Ok(())
  }

  pub async fn permissions(
    &self,
    actor: &Actor,
    family_id: FamilyId,
  ) -> Result<Vec<Grant>> {
    self.require_family(family_id).await?;
    self
      .resolver
      .require(actor, family_id, PermissionLevel::Admin)
      .await?;
    self.store.list_grants(family_id).await.map_err(Error::store)
  }

  // ── Posts & comments ──────────────────────────────────────────────────

  /// Create a post in a family. Any member (a `view` grant or better) may
  /// post; visibility of the post itself is a separate field.
  pub async fn create_post(
    &self,
    actor: &Actor,
    mut input: NewPost,
  ) -> Result<Post> {
    self.require_family(input.family_id).await?;
    self
      .resolver
      .require(actor, input.family_id, PermissionLevel::View)
      .await?;
    input.author_id = actor.user_id;
    self.store.add_post(input).await.map_err(Error::store)
  }

  /// Posts of a family the actor may see. Public posts show for anyone,
  /// `family` posts for members, `admin` posts for family admins.
  pub async fn posts(
    &self,
    actor: Option<&Actor>,
    family_id: FamilyId,
  ) -> Result<Vec<Post>> {
    self.require_family(family_id).await?;
    let mut visible = Vec::new();
    for post in self
      .store
      .posts_in_family(family_id)
      .await
      .map_err(Error::store)?
    {
      if access::can_view_post(&self.resolver, actor, &post).await? {
        visible.push(post);
      }
    }
    Ok(visible)
  }

  /// Comment on a post the actor can view. A parent comment must belong
  /// to the same post; one from any other post counts as unknown.
  pub async fn add_comment(
    &self,
    actor: &Actor,
    mut input: NewComment,
  ) -> Result<Comment> {
    let post = self.require_post(input.post_id).await?;
    if !access::can_view_post(&self.resolver, Some(actor), &post).await? {
      return Err(Error::Forbidden(format!(
        "cannot comment on post {}",
        post.id
      )));
    }
    if let Some(parent_id) = input.parent_comment_id {
      let parent = self
        .store
        .get_comment(parent_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::CommentNotFound(parent_id))?;
      if parent.post_id != post.id {
        return Err(Error::CommentNotFound(parent_id));
      }
    }
    input.author_id = actor.user_id;
    self.store.add_comment(input).await.map_err(Error::store)
  }

  pub async fn comments(
    &self,
    actor: Option<&Actor>,
    post_id: PostId,
  ) -> Result<Vec<Comment>> {
    let post = self.require_post(post_id).await?;
    if !access::can_view_post(&self.resolver, actor, &post).await? {
      return Err(Error::Forbidden(format!("cannot view post {}", post.id)));
    }
    self
      .store
      .comments_on_post(post_id)
      .await
      .map_err(Error::store)
  }

  // ── Lookup helpers ────────────────────────────────────────────────────

  async fn require_person(&self, id: PersonId) -> Result<Person> {
    self
      .store
      .get_person(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(id))
  }

  async fn require_family(&self, id: FamilyId) -> Result<Family> {
    self
      .store
      .get_family(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::FamilyNotFound(id))
  }

  async fn require_relationship(
    &self,
    id: RelationshipId,
  ) -> Result<Relationship> {
    self
      .store
      .get_relationship(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RelationshipNotFound(id))
  }

  async fn require_post(&self, id: PostId) -> Result<Post> {
    self
      .store
      .get_post(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(id))
  }

  // ── Permission helpers ────────────────────────────────────────────────

  async fn require_family_view(
    &self,
    actor: Option<&Actor>,
    family: &Family,
  ) -> Result<()> {
    if access::can_view_family(&self.resolver, actor, family).await? {
      Ok(())
    } else {
      Err(Error::Forbidden(format!("cannot view family {}", family.id)))
    }
  }

  async fn require_viewable_person(
    &self,
    actor: Option<&Actor>,
    id: PersonId,
  ) -> Result<Person> {
    let person = self.require_person(id).await?;
    self.require_person_view(actor, &person).await?;
    Ok(person)
  }

  /// Person visibility follows the owning family's visibility. Persons
  /// without a family are visible to any authenticated caller.
  async fn require_person_view(
    &self,
    actor: Option<&Actor>,
    person: &Person,
  ) -> Result<()> {
    let visible = match person.family_id {
      Some(family_id) => {
        match self
          .store
          .get_family(family_id)
          .await
          .map_err(Error::store)?
        {
          Some(family) => {
            access::can_view_family(&self.resolver, actor, &family).await?
          }
          // The family row is gone but the membership column has not
          // been cleared yet; fall back to the unowned-person rule.
          None => actor.is_some(),
        }
      }
      None => actor.is_some(),
    };
    if visible {
      Ok(())
    } else {
      Err(Error::Forbidden(format!("cannot view person {}", person.id)))
    }
  }

  /// Persons in a family are edited under that family's `edit` grant.
  /// Unowned persons may be edited by their creator and by global admins.
  async fn require_person_edit(
    &self,
    actor: &Actor,
    person: &Person,
  ) -> Result<()> {
    match person.family_id {
      Some(family_id) => {
        self
          .resolver
          .require(actor, family_id, PermissionLevel::Edit)
          .await
      }
      None => {
        if actor.role == Role::Admin
          || person.created_by == Some(actor.user_id)
        {
          Ok(())
        } else {
          Err(Error::Forbidden(format!(
            "cannot edit person {}",
            person.id
          )))
        }
      }
    }
  }

  /// Require `edit` on every distinct family the listed persons belong
  /// to. Unknown persons fail the whole check first.
  async fn require_endpoint_edit(
    &self,
    actor: &Actor,
    ids: &[PersonId],
  ) -> Result<()> {
    let mut checked: Vec<FamilyId> = Vec::new();
    for id in ids {
      let Some(person) =
        self.store.get_person(*id).await.map_err(Error::store)?
      else {
        return Err(Error::PersonNotFound(*id));
      };
      if let Some(family_id) = person.family_id
        && !checked.contains(&family_id)
      {
        self
          .resolver
          .require(actor, family_id, PermissionLevel::Edit)
          .await?;
        checked.push(family_id);
      }
    }
    Ok(())
  }
}
