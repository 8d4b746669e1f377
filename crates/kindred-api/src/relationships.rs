//! Handlers for `/relationships` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/relationships` | 409 on duplicate, 400 on a foreign subtype |
//! | `POST`   | `/relationships/bulk` | All-or-nothing on unknown persons; duplicates skipped |
//! | `PATCH`  | `/relationships/:id` | Subtype must stay within the edge's kind |
//! | `DELETE` | `/relationships/:id` | Returns the removed edge |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{
  ids::RelationshipId,
  relationship::{
    BulkOutcome, NewRelationship, Relationship, UpdateRelationship,
  },
  service::TreeService,
  store::TreeStore,
};
use serde::Deserialize;

use crate::{auth::CurrentActor, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /relationships` — body is a single edge:
/// `{"person1_id":…,"person2_id":…,"kind":"spouse","subtype":"wife"}`
pub async fn create<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<NewRelationship>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TreeStore,
{
  let view = service.create_relationship(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
pub struct BulkBody {
  pub relationships: Vec<NewRelationship>,
}

/// `POST /relationships/bulk`
pub async fn create_bulk<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<BulkBody>,
) -> Result<(StatusCode, Json<BulkOutcome>), ApiError>
where
  S: TreeStore,
{
  let outcome = service.create_bulk(&actor, body.relationships).await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Update & delete ──────────────────────────────────────────────────────────

/// `PATCH /relationships/:id`
pub async fn update_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<RelationshipId>,
  Json(update): Json<UpdateRelationship>,
) -> Result<Json<Relationship>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.update_relationship(&actor, id, update).await?))
}

/// `DELETE /relationships/:id`
pub async fn delete_one<S>(
  State(service): State<Arc<TreeService<S>>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<RelationshipId>,
) -> Result<Json<Relationship>, ApiError>
where
  S: TreeStore,
{
  Ok(Json(service.delete_relationship(&actor, id).await?))
}
