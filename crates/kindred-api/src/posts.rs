//! Handlers for the family feed: posts and their comments.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/families/:id/posts` | Filtered by each post's visibility |
//! | `POST` | `/families/:id/posts` | Requires a `view` grant on the family |
//! | `GET`  | `/posts/:id/comments` | Oldest first |
//! | `POST` | `/posts/:id/comments` | `parent_comment_id` must be on the same post |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{
  ids::{CommentId, FamilyId, PostId},
  service::TreeService,
  social::{Comment, NewComment, NewPost, Post, Visibility},
  store::TreeStore,
};
use serde::Deserialize;

use crate::{
  auth::{CurrentActor, OptionalActor},
  error::ApiError,
};

// ─── Posts ────────────────────────────────────────────────────────────────────

/// `GET /families/:id/posts`
pub async fn list<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(family_id): Path<FamilyId>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.posts(actor.as_ref(), family_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
  pub title:      Option<String>,
  pub content:    String,
  #[serde(default)]
  pub visibility: Visibility,
}

/// `POST /families/:id/posts` — body: `{"content":"…","visibility":"family"}`
pub async fn create<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(family_id): Path<FamilyId>,
  Json(body): Json<CreatePostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TreeStore,
{
  let post = service
    .create_post(&actor, NewPost {
      family_id,
      author_id: actor.user_id,
      title: body.title,
      content: body.content,
      visibility: body.visibility,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// `GET /posts/:id/comments`
pub async fn comments<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(post_id): Path<PostId>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.comments(actor.as_ref(), post_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentBody {
  pub content:           String,
  pub parent_comment_id: Option<CommentId>,
}

/// `POST /posts/:id/comments`
pub async fn add_comment<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(post_id): Path<PostId>,
  Json(body): Json<CreateCommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TreeStore,
{
  let comment = service
    .add_comment(&actor, NewComment {
      post_id,
      author_id: actor.user_id,
      content: body.content,
      parent_comment_id: body.parent_comment_id,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}
