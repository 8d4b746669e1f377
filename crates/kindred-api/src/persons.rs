//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/persons` | `family_id` set requires `edit` on that family |
//! | `GET`    | `/persons/:id` | Visibility follows the person's family |
//! | `PUT`    | `/persons/:id` | Field-wise update; omitted fields keep their value |
//! | `DELETE` | `/persons/:id` | Also removes the person's relationships |
//! | `GET`    | `/persons/:id/parents` | Father first, then mother |
//! | `GET`    | `/persons/:id/children` | Oldest first, unknown birth dates last |
//! | `GET`    | `/persons/:id/spouses` | Current and former, by marriage date |
//! | `GET`    | `/persons/:id/siblings` | Shared-parent derivation |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use kindred_core::{
  ids::{FamilyId, PersonId},
  person::{Gender, NewPerson, Person, UpdatePerson},
  service::TreeService,
  store::TreeStore,
};
use serde::Deserialize;

use crate::{
  auth::{CurrentActor, OptionalActor},
  error::ApiError,
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub first_name:  String,
  pub last_name:   String,
  pub gender:      Gender,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  pub birth_place: Option<String>,
  pub death_place: Option<String>,
  #[serde(default)]
  pub is_deceased: bool,
  pub family_id:   Option<FamilyId>,
}

/// `POST /persons`
pub async fn create<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TreeStore,
{
  let person = service
    .create_person(&actor, NewPerson {
      first_name:  body.first_name,
      last_name:   body.last_name,
      gender:      body.gender,
      birth_date:  body.birth_date,
      death_date:  body.death_date,
      birth_place: body.birth_place,
      death_place: body.death_place,
      is_deceased: body.is_deceased,
      family_id:   body.family_id,
      created_by:  None,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get, update, delete ──────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.person(actor.as_ref(), id).await?))
}

/// `PUT /persons/:id`
pub async fn update_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<PersonId>,
  Json(update): Json<UpdatePerson>,
) -> Result<Json<Person>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.update_person(&actor, id, update).await?))
}

/// `DELETE /persons/:id`
pub async fn delete_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: TreeStore,
{
  service.delete_person(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Derived relations ────────────────────────────────────────────────────────

/// `GET /persons/:id/parents`
pub async fn parents<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.parents(actor.as_ref(), id).await?))
}

/// `GET /persons/:id/children`
pub async fn children<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.children(actor.as_ref(), id).await?))
}

/// `GET /persons/:id/spouses`
pub async fn spouses<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.spouses(actor.as_ref(), id).await?))
}

/// `GET /persons/:id/siblings`
pub async fn siblings<S>(
  State(service): State<Arc<TreeService<S>>>,
  OptionalActor(actor): OptionalActor,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.siblings(actor.as_ref(), id).await?))
}
