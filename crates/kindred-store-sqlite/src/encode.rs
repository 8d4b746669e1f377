//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as ISO
//! 8601 dates. UUIDs are stored as hyphenated lowercase strings, enums as
//! their discriminant strings. Booleans use SQLite's native integers.

use chrono::{DateTime, NaiveDate, Utc};
use kindred_core::{
  family::Family,
  ids::{CommentId, FamilyId, PersonId, PostId, RelationshipId, UserId},
  permission::{Grant, PermissionLevel},
  person::{Gender, Person},
  relationship::{Relationship, RelationshipKind, RelationshipSubtype},
  social::{Comment, Post, Visibility},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse()
    .map_err(|e| Error::Decode(format!("bad date {s:?}: {e}")))
}

// ─── Enum discriminants ──────────────────────────────────────────────────────

// The encode direction uses the `as_str` methods on the core enums; only
// the decode direction lives here.

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    "other" => Ok(Gender::Other),
    other => Err(Error::Decode(format!("unknown gender: {other:?}"))),
  }
}

pub fn decode_kind(s: &str) -> Result<RelationshipKind> {
  match s {
    "parent_child" => Ok(RelationshipKind::ParentChild),
    "spouse" => Ok(RelationshipKind::Spouse),
    "sibling" => Ok(RelationshipKind::Sibling),
    other => {
      Err(Error::Decode(format!("unknown relationship kind: {other:?}")))
    }
  }
}

pub fn decode_subtype(s: &str) -> Result<RelationshipSubtype> {
  match s {
    "mother" => Ok(RelationshipSubtype::Mother),
    "father" => Ok(RelationshipSubtype::Father),
    "husband" => Ok(RelationshipSubtype::Husband),
    "wife" => Ok(RelationshipSubtype::Wife),
    "ex_husband" => Ok(RelationshipSubtype::ExHusband),
    "ex_wife" => Ok(RelationshipSubtype::ExWife),
    "brother" => Ok(RelationshipSubtype::Brother),
    "sister" => Ok(RelationshipSubtype::Sister),
    other => {
      Err(Error::Decode(format!("unknown relationship subtype: {other:?}")))
    }
  }
}

pub fn decode_level(s: &str) -> Result<PermissionLevel> {
  match s {
    "view" => Ok(PermissionLevel::View),
    "edit" => Ok(PermissionLevel::Edit),
    "admin" => Ok(PermissionLevel::Admin),
    other => Err(Error::Decode(format!("unknown permission level: {other:?}"))),
  }
}

pub fn decode_visibility(s: &str) -> Result<Visibility> {
  match s {
    "public" => Ok(Visibility::Public),
    "family" => Ok(Visibility::Family),
    "admin" => Ok(Visibility::Admin),
    other => Err(Error::Decode(format!("unknown visibility: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:          String,
  pub first_name:  String,
  pub last_name:   String,
  pub gender:      String,
  pub birth_date:  Option<String>,
  pub death_date:  Option<String>,
  pub birth_place: Option<String>,
  pub death_place: Option<String>,
  pub is_deceased: bool,
  pub family_id:   Option<String>,
  pub created_by:  Option<String>,
  pub created_at:  String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          PersonId(decode_uuid(&self.id)?),
      gender:      decode_gender(&self.gender)?,
      birth_date:  self.birth_date.as_deref().map(decode_date).transpose()?,
      death_date:  self.death_date.as_deref().map(decode_date).transpose()?,
      is_deceased: self.is_deceased,
      family_id:   self
        .family_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?
        .map(FamilyId),
      created_by:  self
        .created_by
        .as_deref()
        .map(decode_uuid)
        .transpose()?
        .map(UserId),
      created_at:  decode_dt(&self.created_at)?,
      first_name:  self.first_name,
      last_name:   self.last_name,
      birth_place: self.birth_place,
      death_place: self.death_place,
    })
  }
}

/// Raw values read directly from a `families` row.
pub struct RawFamily {
  pub id:          String,
  pub name:        String,
  pub description: Option<String>,
  pub is_public:   bool,
  pub created_by:  Option<String>,
  pub created_at:  String,
}

impl RawFamily {
  pub fn into_family(self) -> Result<Family> {
    Ok(Family {
      id:          FamilyId(decode_uuid(&self.id)?),
      is_public:   self.is_public,
      created_by:  self
        .created_by
        .as_deref()
        .map(decode_uuid)
        .transpose()?
        .map(UserId),
      created_at:  decode_dt(&self.created_at)?,
      name:        self.name,
      description: self.description,
    })
  }
}

/// Raw values read directly from a `relationships` row.
pub struct RawRelationship {
  pub id:            String,
  pub person1_id:    String,
  pub person2_id:    String,
  pub kind:          String,
  pub subtype:       String,
  pub marriage_date: Option<String>,
  pub divorce_date:  Option<String>,
  pub is_active:     bool,
  pub created_at:    String,
}

impl RawRelationship {
  pub fn into_relationship(self) -> Result<Relationship> {
    Ok(Relationship {
      id:            RelationshipId(decode_uuid(&self.id)?),
      person1_id:    PersonId(decode_uuid(&self.person1_id)?),
      person2_id:    PersonId(decode_uuid(&self.person2_id)?),
      kind:          decode_kind(&self.kind)?,
      subtype:       decode_subtype(&self.subtype)?,
      marriage_date: self
        .marriage_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      divorce_date:  self
        .divorce_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      is_active:     self.is_active,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `grants` row.
pub struct RawGrant {
  pub user_id:    String,
  pub family_id:  String,
  pub level:      String,
  pub created_at: String,
}

impl RawGrant {
  pub fn into_grant(self) -> Result<Grant> {
    Ok(Grant {
      user_id:    UserId(decode_uuid(&self.user_id)?),
      family_id:  FamilyId(decode_uuid(&self.family_id)?),
      level:      decode_level(&self.level)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub id:         String,
  pub family_id:  String,
  pub author_id:  String,
  pub title:      Option<String>,
  pub content:    String,
  pub visibility: String,
  pub created_at: String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:         PostId(decode_uuid(&self.id)?),
      family_id:  FamilyId(decode_uuid(&self.family_id)?),
      author_id:  UserId(decode_uuid(&self.author_id)?),
      visibility: decode_visibility(&self.visibility)?,
      created_at: decode_dt(&self.created_at)?,
      title:      self.title,
      content:    self.content,
    })
  }
}

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:                String,
  pub post_id:           String,
  pub author_id:         String,
  pub content:           String,
  pub parent_comment_id: Option<String>,
  pub created_at:        String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:                CommentId(decode_uuid(&self.id)?),
      post_id:           PostId(decode_uuid(&self.post_id)?),
      author_id:         UserId(decode_uuid(&self.author_id)?),
      parent_comment_id: self
        .parent_comment_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?
        .map(CommentId),
      created_at:        decode_dt(&self.created_at)?,
      content:           self.content,
    })
  }
}
