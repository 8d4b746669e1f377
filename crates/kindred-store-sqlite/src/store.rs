//! [`SqliteStore`] — the SQLite implementation of [`TreeStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use kindred_core::{
  family::{Family, NewFamily},
  ids::{CommentId, FamilyId, PersonId, PostId, RelationshipId, UserId},
  permission::{Grant, PermissionLevel},
  person::{NewPerson, Person, UpdatePerson},
  relationship::{
    NewRelationship, Relationship, RelationshipKind, UpdateRelationship,
  },
  social::{Comment, NewComment, NewPost, Post},
  store::{InsertOutcome, TreeStore},
};

use crate::{
  Error, Result,
  encode::{
    RawComment, RawFamily, RawGrant, RawPerson, RawPost, RawRelationship,
    decode_level, encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Column lists & row mappers ──────────────────────────────────────────────

// Kept in one place so every SELECT stays in sync with its row mapper.

const PERSON_COLS: &str = "id, first_name, last_name, gender, birth_date, \
                           death_date, birth_place, death_place, \
                           is_deceased, family_id, created_by, created_at";

const FAMILY_COLS: &str =
  "id, name, description, is_public, created_by, created_at";

const REL_COLS: &str = "id, person1_id, person2_id, kind, subtype, \
                        marriage_date, divorce_date, is_active, created_at";

const GRANT_COLS: &str = "user_id, family_id, level, created_at";

const POST_COLS: &str =
  "id, family_id, author_id, title, content, visibility, created_at";

const COMMENT_COLS: &str =
  "id, post_id, author_id, content, parent_comment_id, created_at";

fn person_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    id:          row.get(0)?,
    first_name:  row.get(1)?,
    last_name:   row.get(2)?,
    gender:      row.get(3)?,
    birth_date:  row.get(4)?,
    death_date:  row.get(5)?,
    birth_place: row.get(6)?,
    death_place: row.get(7)?,
    is_deceased: row.get(8)?,
    family_id:   row.get(9)?,
    created_by:  row.get(10)?,
    created_at:  row.get(11)?,
  })
}

fn family_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFamily> {
  Ok(RawFamily {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    is_public:   row.get(3)?,
    created_by:  row.get(4)?,
    created_at:  row.get(5)?,
  })
}

fn relationship_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawRelationship> {
  Ok(RawRelationship {
    id:            row.get(0)?,
    person1_id:    row.get(1)?,
    person2_id:    row.get(2)?,
    kind:          row.get(3)?,
    subtype:       row.get(4)?,
    marriage_date: row.get(5)?,
    divorce_date:  row.get(6)?,
    is_active:     row.get(7)?,
    created_at:    row.get(8)?,
  })
}

fn grant_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawGrant> {
  Ok(RawGrant {
    user_id:    row.get(0)?,
    family_id:  row.get(1)?,
    level:      row.get(2)?,
    created_at: row.get(3)?,
  })
}

fn post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    id:         row.get(0)?,
    family_id:  row.get(1)?,
    author_id:  row.get(2)?,
    title:      row.get(3)?,
    content:    row.get(4)?,
    visibility: row.get(5)?,
    created_at: row.get(6)?,
  })
}

fn comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    id:                row.get(0)?,
    post_id:           row.get(1)?,
    author_id:         row.get(2)?,
    content:           row.get(3)?,
    parent_comment_id: row.get(4)?,
    created_at:        row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kindred tree store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TreeStore impl ──────────────────────────────────────────────────────────

impl TreeStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      id:          PersonId::new(),
      first_name:  input.first_name,
      last_name:   input.last_name,
      gender:      input.gender,
      birth_date:  input.birth_date,
      death_date:  input.death_date,
      birth_place: input.birth_place,
      death_place: input.death_place,
      is_deceased: input.is_deceased,
      family_id:   input.family_id,
      created_by:  input.created_by,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(person.id.0);
    let first_name  = person.first_name.clone();
    let last_name   = person.last_name.clone();
    let gender_str  = person.gender.as_str();
    let birth_str   = person.birth_date.map(encode_date);
    let death_str   = person.death_date.map(encode_date);
    let birth_place = person.birth_place.clone();
    let death_place = person.death_place.clone();
    let is_deceased = person.is_deceased;
    let family_str  = person.family_id.map(|id| encode_uuid(id.0));
    let creator_str = person.created_by.map(|id| encode_uuid(id.0));
    let at_str      = encode_dt(person.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             id, first_name, last_name, gender, birth_date, death_date,
             birth_place, death_place, is_deceased, family_id,
             created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id_str,
            first_name,
            last_name,
            gender_str,
            birth_str,
            death_str,
            birth_place,
            death_place,
            is_deceased,
            family_str,
            creator_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLS} FROM persons WHERE id = ?1"),
              rusqlite::params![id_str],
              person_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn persons_by_ids(&self, ids: Vec<PersonId>) -> Result<Vec<Person>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let id_strs: Vec<String> =
      ids.iter().map(|id| encode_uuid(id.0)).collect();

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; id_strs.len()].join(", ");
        let sql = format!(
          "SELECT {PERSON_COLS} FROM persons WHERE id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs), person_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn persons_in_family(
    &self,
    family_id: FamilyId,
  ) -> Result<Vec<Person>> {
    let family_str = encode_uuid(family_id.0);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLS} FROM persons WHERE family_id = ?1
           ORDER BY first_name, last_name"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![family_str], person_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn update_person(
    &self,
    id: PersonId,
    update: UpdatePerson,
  ) -> Result<Option<Person>> {
    let id_str      = encode_uuid(id.0);
    let first_name  = update.first_name;
    let last_name   = update.last_name;
    let gender_str  = update.gender.map(|g| g.as_str().to_owned());
    let birth_str   = update.birth_date.map(encode_date);
    let death_str   = update.death_date.map(encode_date);
    let birth_place = update.birth_place;
    let death_place = update.death_place;
    let is_deceased = update.is_deceased;

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE persons SET
             first_name  = COALESCE(?2, first_name),
             last_name   = COALESCE(?3, last_name),
             gender      = COALESCE(?4, gender),
             birth_date  = COALESCE(?5, birth_date),
             death_date  = COALESCE(?6, death_date),
             birth_place = COALESCE(?7, birth_place),
             death_place = COALESCE(?8, death_place),
             is_deceased = COALESCE(?9, is_deceased)
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            first_name,
            last_name,
            gender_str,
            birth_str,
            death_str,
            birth_place,
            death_place,
            is_deceased,
          ],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLS} FROM persons WHERE id = ?1"),
              rusqlite::params![id_str],
              person_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete_person(&self, id: PersonId) -> Result<bool> {
    let id_str = encode_uuid(id.0);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM persons WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn insert_relationship(
    &self,
    input: NewRelationship,
  ) -> Result<InsertOutcome> {
    let relationship = Relationship {
      id:            RelationshipId::new(),
      person1_id:    input.person1_id,
      person2_id:    input.person2_id,
      kind:          input.kind,
      subtype:       input.subtype,
      marriage_date: input.marriage_date,
      divorce_date:  input.divorce_date,
      is_active:     true,
      created_at:    Utc::now(),
    };

    let id_str       = encode_uuid(relationship.id.0);
    let p1_str       = encode_uuid(relationship.person1_id.0);
    let p2_str       = encode_uuid(relationship.person2_id.0);
    let kind_str     = relationship.kind.as_str();
    let subtype_str  = relationship.subtype.as_str();
    let married_str  = relationship.marriage_date.map(encode_date);
    let divorced_str = relationship.divorce_date.map(encode_date);
    let is_active    = relationship.is_active;
    let at_str       = encode_dt(relationship.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO relationships (
             id, person1_id, person2_id, kind, subtype,
             marriage_date, divorce_date, is_active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            p1_str,
            p2_str,
            kind_str,
            subtype_str,
            married_str,
            divorced_str,
            is_active,
            at_str,
          ],
        );
        match inserted {
          Ok(_) => Ok(InsertOutcome::Inserted(relationship)),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(InsertOutcome::Duplicate)
          }
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code
              == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
          {
            Ok(InsertOutcome::MissingEndpoint)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(outcome)
  }

  async fn get_relationship(
    &self,
    id: RelationshipId,
  ) -> Result<Option<Relationship>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REL_COLS} FROM relationships WHERE id = ?1"),
              rusqlite::params![id_str],
              relationship_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn relationship_between(
    &self,
    person1_id: PersonId,
    person2_id: PersonId,
    kind: RelationshipKind,
  ) -> Result<Option<Relationship>> {
    let p1_str   = encode_uuid(person1_id.0);
    let p2_str   = encode_uuid(person2_id.0);
    let kind_str = kind.as_str();

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REL_COLS} FROM relationships
                 WHERE person1_id = ?1 AND person2_id = ?2 AND kind = ?3"
              ),
              rusqlite::params![p1_str, p2_str, kind_str],
              relationship_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn edges_from(
    &self,
    person_id: PersonId,
    kind: RelationshipKind,
  ) -> Result<Vec<Relationship>> {
    let id_str   = encode_uuid(person_id.0);
    let kind_str = kind.as_str();

    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REL_COLS} FROM relationships
           WHERE person1_id = ?1 AND kind = ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, kind_str], relationship_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRelationship::into_relationship)
      .collect()
  }

  async fn edges_to(
    &self,
    person_id: PersonId,
    kind: RelationshipKind,
  ) -> Result<Vec<Relationship>> {
    let id_str   = encode_uuid(person_id.0);
    let kind_str = kind.as_str();

    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REL_COLS} FROM relationships
           WHERE person2_id = ?1 AND kind = ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, kind_str], relationship_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRelationship::into_relationship)
      .collect()
  }

  async fn edges_touching(
    &self,
    person_id: PersonId,
    kind: RelationshipKind,
  ) -> Result<Vec<Relationship>> {
    let id_str   = encode_uuid(person_id.0);
    let kind_str = kind.as_str();

    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REL_COLS} FROM relationships
           WHERE (person1_id = ?1 OR person2_id = ?1) AND kind = ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, kind_str], relationship_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRelationship::into_relationship)
      .collect()
  }

  async fn update_relationship(
    &self,
    id: RelationshipId,
    update: UpdateRelationship,
  ) -> Result<Option<Relationship>> {
    let id_str       = encode_uuid(id.0);
    let subtype_str  = update.subtype.map(|s| s.as_str().to_owned());
    let married_str  = update.marriage_date.map(encode_date);
    let divorced_str = update.divorce_date.map(encode_date);
    let is_active    = update.is_active;

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE relationships SET
             subtype       = COALESCE(?2, subtype),
             marriage_date = COALESCE(?3, marriage_date),
             divorce_date  = COALESCE(?4, divorce_date),
             is_active     = COALESCE(?5, is_active)
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            subtype_str,
            married_str,
            divorced_str,
            is_active,
          ],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {REL_COLS} FROM relationships WHERE id = ?1"),
              rusqlite::params![id_str],
              relationship_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn delete_relationship(
    &self,
    id: RelationshipId,
  ) -> Result<Option<Relationship>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            &format!("SELECT {REL_COLS} FROM relationships WHERE id = ?1"),
            rusqlite::params![id_str],
            relationship_row,
          )
          .optional()?;
        if existing.is_some() {
          conn.execute(
            "DELETE FROM relationships WHERE id = ?1",
            rusqlite::params![id_str],
          )?;
        }
        Ok(existing)
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  // ── Families ──────────────────────────────────────────────────────────────

  async fn add_family(&self, input: NewFamily) -> Result<Family> {
    let family = Family {
      id:          FamilyId::new(),
      name:        input.name,
      description: input.description,
      is_public:   input.is_public,
      created_by:  input.created_by,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(family.id.0);
    let name        = family.name.clone();
    let description = family.description.clone();
    let is_public   = family.is_public;
    let creator_str = family.created_by.map(|id| encode_uuid(id.0));
    let at_str      = encode_dt(family.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO families (
             id, name, description, is_public, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            name,
            description,
            is_public,
            creator_str,
            at_str,
          ],
        )?;
        // The creator starts with full control of the new family.
        if let Some(creator) = &creator_str {
          tx.execute(
            "INSERT INTO grants (user_id, family_id, level, created_at)
             VALUES (?1, ?2, 'admin', ?3)",
            rusqlite::params![creator, id_str, at_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(family)
  }

  async fn get_family(&self, id: FamilyId) -> Result<Option<Family>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawFamily> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FAMILY_COLS} FROM families WHERE id = ?1"),
              rusqlite::params![id_str],
              family_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFamily::into_family).transpose()
  }

  async fn list_families(&self) -> Result<Vec<Family>> {
    let raws: Vec<RawFamily> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FAMILY_COLS} FROM families ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], family_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFamily::into_family).collect()
  }

  async fn delete_family(&self, id: FamilyId) -> Result<bool> {
    let id_str = encode_uuid(id.0);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM families WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  // ── Grants ────────────────────────────────────────────────────────────────

  async fn grant_level(
    &self,
    user_id: UserId,
    family_id: FamilyId,
  ) -> Result<Option<PermissionLevel>> {
    let user_str   = encode_uuid(user_id.0);
    let family_str = encode_uuid(family_id.0);

    let level_str: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT level FROM grants
               WHERE user_id = ?1 AND family_id = ?2",
              rusqlite::params![user_str, family_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    level_str.as_deref().map(decode_level).transpose()
  }

  async fn upsert_grant(
    &self,
    user_id: UserId,
    family_id: FamilyId,
    level: PermissionLevel,
  ) -> Result<Grant> {
    let user_str   = encode_uuid(user_id.0);
    let family_str = encode_uuid(family_id.0);
    let level_str  = level.as_str();
    let at_str     = encode_dt(Utc::now());

    let raw: RawGrant = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO grants (user_id, family_id, level, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id, family_id) DO UPDATE
           SET level = excluded.level",
          rusqlite::params![user_str, family_str, level_str, at_str],
        )?;
        // Re-read: a replaced grant keeps its original created_at.
        Ok(conn.query_row(
          &format!(
            "SELECT {GRANT_COLS} FROM grants
             WHERE user_id = ?1 AND family_id = ?2"
          ),
          rusqlite::params![user_str, family_str],
          grant_row,
        )?)
      })
      .await?;

    raw.into_grant()
  }

  async fn revoke_grant(
    &self,
    user_id: UserId,
    family_id: FamilyId,
  ) -> Result<bool> {
    let user_str   = encode_uuid(user_id.0);
    let family_str = encode_uuid(family_id.0);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM grants WHERE user_id = ?1 AND family_id = ?2",
          rusqlite::params![user_str, family_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  async fn list_grants(&self, family_id: FamilyId) -> Result<Vec<Grant>> {
    let family_str = encode_uuid(family_id.0);

    let raws: Vec<RawGrant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GRANT_COLS} FROM grants WHERE family_id = ?1
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![family_str], grant_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGrant::into_grant).collect()
  }

  // ── Posts & comments ──────────────────────────────────────────────────────

  async fn add_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      id:         PostId::new(),
      family_id:  input.family_id,
      author_id:  input.author_id,
      title:      input.title,
      content:    input.content,
      visibility: input.visibility,
      created_at: Utc::now(),
    };

    let id_str         = encode_uuid(post.id.0);
    let family_str     = encode_uuid(post.family_id.0);
    let author_str     = encode_uuid(post.author_id.0);
    let title          = post.title.clone();
    let content        = post.content.clone();
    let visibility_str = post.visibility.as_str();
    let at_str         = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (
             id, family_id, author_id, title, content, visibility,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            family_str,
            author_str,
            title,
            content,
            visibility_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POST_COLS} FROM posts WHERE id = ?1"),
              rusqlite::params![id_str],
              post_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn posts_in_family(&self, family_id: FamilyId) -> Result<Vec<Post>> {
    let family_str = encode_uuid(family_id.0);

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLS} FROM posts WHERE family_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![family_str], post_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      id:                CommentId::new(),
      post_id:           input.post_id,
      author_id:         input.author_id,
      content:           input.content,
      parent_comment_id: input.parent_comment_id,
      created_at:        Utc::now(),
    };

    let id_str     = encode_uuid(comment.id.0);
    let post_str   = encode_uuid(comment.post_id.0);
    let author_str = encode_uuid(comment.author_id.0);
    let content    = comment.content.clone();
    let parent_str = comment.parent_comment_id.map(|id| encode_uuid(id.0));
    let at_str     = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (
             id, post_id, author_id, content, parent_comment_id,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            post_str,
            author_str,
            content,
            parent_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLS} FROM comments WHERE id = ?1"),
              rusqlite::params![id_str],
              comment_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn comments_on_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
    let post_str = encode_uuid(post_id.0);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLS} FROM comments WHERE post_id = ?1
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post_str], comment_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }
}
