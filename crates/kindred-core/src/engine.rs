//! The relationship graph engine.
//!
//! Persons are nodes, relationships are typed edges, and family views
//! (parents, children, spouses, siblings) are derived on read by walking
//! edges. Nothing derived is ever persisted.
//!
//! Duplicate detection follows each kind's directionality policy (see
//! [`RelationshipKind::directionality`]), and the storage layer's
//! uniqueness constraint stays authoritative: the engine's own existence
//! check is an early exit, not the guarantee.

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use crate::{
  Error, Result,
  ids::{PersonId, RelationshipId},
  person::Person,
  relationship::{
    BulkOutcome, Directionality, NewRelationship, Relationship,
    RelationshipKind, RelationshipSubtype, RelationshipView,
    UpdateRelationship,
  },
  store::{InsertOutcome, TreeStore},
};

pub struct GraphEngine<S> {
  store: Arc<S>,
}

impl<S: TreeStore> GraphEngine<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  // ── Edge creation ─────────────────────────────────────────────────────

  /// Check a prospective edge without writing anything.
  ///
  /// Fails with [`Error::PersonNotFound`] if either endpoint is unknown,
  /// [`Error::InvalidSubtype`] if the subtype does not belong to the
  /// kind, and [`Error::DuplicateRelationship`] if an equivalent edge
  /// already exists under the kind's directionality policy.
  pub async fn validate_edge(&self, input: &NewRelationship) -> Result<()> {
    self.checked_endpoints(input).await?;
    Ok(())
  }

  /// Validate and insert an edge, returning it together with both
  /// endpoint display names.
  pub async fn create_edge(
    &self,
    input: NewRelationship,
  ) -> Result<RelationshipView> {
    let (person1, person2) = self.checked_endpoints(&input).await?;

    match self
      .store
      .insert_relationship(input)
      .await
      .map_err(Error::store)?
    {
      InsertOutcome::Inserted(relationship) => Ok(RelationshipView {
        relationship,
        person1_name: person1.display_name(),
        person2_name: person2.display_name(),
      }),
      InsertOutcome::Duplicate => {
        Err(Error::DuplicateRelationship(person1.id, person2.id))
      }
      InsertOutcome::MissingEndpoint => Err(Error::PersonNotFound(
        self.missing_endpoint(person1.id, person2.id).await?,
      )),
    }
  }

  /// Insert a batch of edges.
  ///
  /// Every endpoint named anywhere in the batch must exist, or the whole
  /// batch fails with [`Error::PersonNotFound`] before a single insert.
  /// Edges that already exist are skipped and counted, never an error. A
  /// kind/subtype mismatch aborts at the offending item; edges created
  /// earlier in the batch remain.
  pub async fn create_bulk(
    &self,
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
    self.require_persons(&endpoint_ids).await?;

    let mut created = Vec::new();
    let mut skipped = 0;
    for input in inputs {
      if !input.kind.allows(input.subtype) {
        return Err(Error::InvalidSubtype {
          kind:    input.kind,
          subtype: input.subtype,
        });
      }
      if self
        .edge_exists(input.person1_id, input.person2_id, input.kind)
        .await?
      {
        skipped += 1;
        continue;
      }
      let (person1_id, person2_id) = (input.person1_id, input.person2_id);
      match self
        .store
        .insert_relationship(input)
        .await
        .map_err(Error::store)?
      {
        InsertOutcome::Inserted(relationship) => created.push(relationship),
        InsertOutcome::Duplicate => skipped += 1,
        InsertOutcome::MissingEndpoint => {
          return Err(Error::PersonNotFound(
            self.missing_endpoint(person1_id, person2_id).await?,
          ));
        }
      }
    }

    Ok(BulkOutcome { created, skipped })
  }

  // ── Edge update & removal ─────────────────────────────────────────────

  /// Update an edge's subtype, marriage metadata, or active flag. The
  /// kind and endpoints never change; a replacement edge is a delete plus
  /// a create. A new subtype must belong to the existing kind.
  pub async fn update_edge(
    &self,
    id: RelationshipId,
    update: UpdateRelationship,
  ) -> Result<Relationship> {
    let existing = self
      .store
      .get_relationship(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RelationshipNotFound(id))?;

    if let Some(subtype) = update.subtype
      && !existing.kind.allows(subtype)
    {
      return Err(Error::InvalidSubtype { kind: existing.kind, subtype });
    }

    self
      .store
      .update_relationship(id, update)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RelationshipNotFound(id))
  }

  /// Delete an edge, returning the removed record.
  pub async fn delete_edge(&self, id: RelationshipId) -> Result<Relationship> {
    self
      .store
      .delete_relationship(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RelationshipNotFound(id))
  }

  // ── Derived views ─────────────────────────────────────────────────────

  /// Parents of a person: the `person1` side of incoming `parent_child`
  /// edges. Ordered fathers before mothers, then by first name.
  pub async fn parents_of(&self, person_id: PersonId) -> Result<Vec<Person>> {
    self.require_person(person_id).await?;

    let edges = self
      .store
      .edges_to(person_id, RelationshipKind::ParentChild)
      .await
      .map_err(Error::store)?;
    let roles: HashMap<PersonId, RelationshipSubtype> =
      edges.iter().map(|e| (e.person1_id, e.subtype)).collect();

    let mut parents = self
      .store
      .persons_by_ids(roles.keys().copied().collect())
      .await
      .map_err(Error::store)?;
    parents.sort_by_key(|p| {
      (
        roles.get(&p.id).copied() == Some(RelationshipSubtype::Mother),
        p.first_name.clone(),
      )
    });
    Ok(parents)
  }

  /// Children of a person: the `person2` side of outgoing `parent_child`
  /// edges. Ordered by birth date ascending with unknown dates last, then
  /// by first name.
  pub async fn children_of(&self, person_id: PersonId) -> Result<Vec<Person>> {
    self.require_person(person_id).await?;

    let edges = self
      .store
      .edges_from(person_id, RelationshipKind::ParentChild)
      .await
      .map_err(Error::store)?;
    let child_ids: Vec<PersonId> =
      edges.iter().map(|e| e.person2_id).collect();

    let mut children = self
      .store
      .persons_by_ids(child_ids)
      .await
      .map_err(Error::store)?;
    children.sort_by_key(birth_order);
    Ok(children)
  }

  /// Spouses of a person, from `spouse` edges in either stored direction.
  /// Ex-spouses are included; callers that want current marriages only
  /// filter on the edge themselves. Ordered by marriage date ascending
  /// with unknown dates last, then by first name.
  pub async fn spouses_of(&self, person_id: PersonId) -> Result<Vec<Person>> {
    self.require_person(person_id).await?;

    let edges = self
      .store
      .edges_touching(person_id, RelationshipKind::Spouse)
      .await
      .map_err(Error::store)?;
    let mut married = HashMap::new();
    for edge in &edges {
      let other = if edge.person1_id == person_id {
        edge.person2_id
      } else {
        edge.person1_id
      };
      married.insert(other, edge.marriage_date);
    }

    let mut spouses = self
      .store
      .persons_by_ids(married.keys().copied().collect())
      .await
      .map_err(Error::store)?;
    spouses.sort_by_key(|p| {
      let date = married.get(&p.id).copied().flatten();
      (date.is_none(), date, p.first_name.clone())
    });
    Ok(spouses)
  }

  /// Siblings of a person: everyone sharing at least one parent,
  /// deduplicated, with the person themself excluded. Half and full
  /// siblings are not distinguished. Ordered like [`Self::children_of`].
  pub async fn siblings_of(&self, person_id: PersonId) -> Result<Vec<Person>> {
    self.require_person(person_id).await?;

    let parent_edges = self
      .store
      .edges_to(person_id, RelationshipKind::ParentChild)
      .await
      .map_err(Error::store)?;

    let mut sibling_ids = HashSet::new();
    for parent_edge in &parent_edges {
      let child_edges = self
        .store
        .edges_from(parent_edge.person1_id, RelationshipKind::ParentChild)
        .await
        .map_err(Error::store)?;
      for child_edge in child_edges {
        sibling_ids.insert(child_edge.person2_id);
      }
    }
    sibling_ids.remove(&person_id);

    let mut siblings = self
      .store
      .persons_by_ids(sibling_ids.into_iter().collect())
      .await
      .map_err(Error::store)?;
    siblings.sort_by_key(birth_order);
    Ok(siblings)
  }

  // ── Internals ─────────────────────────────────────────────────────────

  /// Run the full pre-insert validation and hand back both endpoints.
  async fn checked_endpoints(
    &self,
    input: &NewRelationship,
  ) -> Result<(Person, Person)> {
    let persons = self
      .require_persons(&[input.person1_id, input.person2_id])
      .await?;
    // Self-edges fetch a single row, so look endpoints up by id.
    let endpoint = |id: PersonId| -> Result<Person> {
      persons
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or(Error::PersonNotFound(id))
    };
    let person1 = endpoint(input.person1_id)?;
    let person2 = endpoint(input.person2_id)?;

    if !input.kind.allows(input.subtype) {
      return Err(Error::InvalidSubtype {
        kind:    input.kind,
        subtype: input.subtype,
      });
    }
    if self
      .edge_exists(input.person1_id, input.person2_id, input.kind)
      .await?
    {
      return Err(Error::DuplicateRelationship(
        input.person1_id,
        input.person2_id,
      ));
    }

    Ok((person1, person2))
  }

  /// Whether an equivalent edge exists under the kind's directionality
  /// policy: directed kinds match the ordered pair only, undirected kinds
  /// match either stored direction.
  async fn edge_exists(
    &self,
    person1_id: PersonId,
    person2_id: PersonId,
    kind: RelationshipKind,
  ) -> Result<bool> {
    if self
      .store
      .relationship_between(person1_id, person2_id, kind)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Ok(true);
    }
    match kind.directionality() {
      Directionality::Directed => Ok(false),
      Directionality::Undirected => Ok(
        self
          .store
          .relationship_between(person2_id, person1_id, kind)
          .await
          .map_err(Error::store)?
          .is_some(),
      ),
    }
  }

  async fn require_person(&self, id: PersonId) -> Result<Person> {
    self
      .store
      .get_person(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(id))
  }

  /// Fetch every listed person, failing with the first missing id.
  async fn require_persons(&self, ids: &[PersonId]) -> Result<Vec<Person>> {
    let persons = self
      .store
      .persons_by_ids(ids.to_vec())
      .await
      .map_err(Error::store)?;
    for id in ids {
      if !persons.iter().any(|p| p.id == *id) {
        return Err(Error::PersonNotFound(*id));
      }
    }
    Ok(persons)
  }

  /// Name the endpoint that no longer exists after a foreign-key
  /// rejection.
  async fn missing_endpoint(
    &self,
    person1_id: PersonId,
    person2_id: PersonId,
  ) -> Result<PersonId> {
    if self
      .store
      .get_person(person1_id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      Ok(person1_id)
    } else {
      Ok(person2_id)
    }
  }
}

/// Birth-date-ascending sort key with unknown dates last, first name as
/// the tiebreak.
fn birth_order(person: &Person) -> (bool, Option<chrono::NaiveDate>, String) {
  (
    person.birth_date.is_none(),
    person.birth_date,
    person.first_name.clone(),
  )
}
