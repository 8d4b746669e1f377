//! Handlers for `/families` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/families` | Only families the caller may view |
//! | `POST`   | `/families` | Creator receives an `admin` grant |
//! | `GET`    | `/families/:id` | 403 for a private family the caller cannot view |
//! | `DELETE` | `/families/:id` | Requires an `admin` grant |
//! | `GET`    | `/families/:id/members` | |
//! | `GET`    | `/families/:id/permissions` | Requires an `admin` grant |
//! | `PUT`    | `/families/:id/permissions/:user_id` | Body: `{"level":"edit"}` |
//! | `DELETE` | `/families/:id/permissions/:user_id` | Revokes the grant |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{
  family::{Family, NewFamily},
  ids::{FamilyId, UserId},
  permission::{Grant, PermissionLevel},
  person::Person,
  service::TreeService,
  store::TreeStore,
};
use serde::Deserialize;

use crate::{
  auth::{CurrentActor, OptionalActor},
  error::ApiError,
};

// ─── List & create ────────────────────────────────────────────────────────────

/// `GET /families`
pub async fn list<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
) -> Result<Json<Vec<Family>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.families(actor.as_ref()).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub description: Option<String>,
  #[serde(default)]
  pub is_public:   bool,
}

/// `POST /families` — body: `{"name":"Kowalski","is_public":false}`
pub async fn create<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TreeStore,
{
  let family = service
    .create_family(&actor, NewFamily {
      name:        body.name,
      description: body.description,
      is_public:   body.is_public,
      created_by:  None,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(family)))
}

// ─── Get & delete ─────────────────────────────────────────────────────────────

/// `GET /families/:id`
pub async fn get_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<FamilyId>,
) -> Result<Json<Family>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.family(actor.as_ref(), id).await?))
}

/// `DELETE /families/:id`
pub async fn delete_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<FamilyId>,
) -> Result<StatusCode, ApiError>
where
  S: TreeStore,
{
  service.delete_family(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Members ──────────────────────────────────────────────────────────────────

/// `GET /families/:id/members`
pub async fn members<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<FamilyId>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.family_members(actor.as_ref(), id).await?))
}

// ─── Grants ───────────────────────────────────────────────────────────────────

/// `GET /families/:id/permissions`
pub async fn permissions<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<FamilyId>,
) -> Result<Json<Vec<Grant>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.permissions(&actor, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct GrantBody {
  pub level: PermissionLevel,
}

/// `PUT /families/:id/permissions/:user_id` — body: `{"level":"edit"}`
pub async fn put_permission<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path((family_id, user_id)): Path<(FamilyId, UserId)>,
  Json(body): Json<GrantBody>,
) -> Result<Json<Grant>, ApiError>
where
  S: TreeStore,
{
  let grant = service
    .set_permission(&actor, family_id, user_id, body.level)
    .await?;
  Ok(Json(grant))
}

/// `DELETE /families/:id/permissions/:user_id`
pub async fn delete_permission<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path((family_id, user_id)): Path<(FamilyId, UserId)>,
) -> Result<StatusCode, ApiError>
where
  S: TreeStore,
{
  service.remove_member(&actor, family_id, user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
