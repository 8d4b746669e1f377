//! Posts and comments, the family-scoped social feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommentId, FamilyId, PostId, UserId};

/// Who may read a post. Resolved against the reader's grant on the post's
/// family at query time, never stored per reader.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  /// Readable by anyone, including anonymous readers.
  Public,
  /// Readable by actors holding at least a `view` grant.
  #[default]
  Family,
  /// Readable by actors holding an `admin` grant.
  Admin,
}

impl Visibility {
  /// The discriminant string stored in the `visibility` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Public => "public",
      Self::Family => "family",
      Self::Admin => "admin",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:         PostId,
  pub family_id:  FamilyId,
  pub author_id:  UserId,
  pub title:      Option<String>,
  pub content:    String,
  pub visibility: Visibility,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::TreeStore::add_post`]. `author_id` is
/// overwritten with the acting user by the service layer.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub family_id:  FamilyId,
  pub author_id:  UserId,
  pub title:      Option<String>,
  pub content:    String,
  pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id:                CommentId,
  pub post_id:           PostId,
  pub author_id:         UserId,
  pub content:           String,
  /// Reply threading; always references a comment on the same post.
  pub parent_comment_id: Option<CommentId>,
  pub created_at:        DateTime<Utc>,
}

/// Input to [`crate::store::TreeStore::add_comment`]. `author_id` is
/// overwritten with the acting user by the service layer.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id:           PostId,
  pub author_id:         UserId,
  pub content:           String,
  pub parent_comment_id: Option<CommentId>,
}
