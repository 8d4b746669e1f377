//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kindred_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Core errors map onto HTTP statuses here and nowhere else; handlers
/// propagate them with `?`.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The endpoint needs an authenticated caller and none was presented.
  #[error("authentication required")]
  Unauthorized,

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Core(e) => match e {
        CoreError::PersonNotFound(_)
        | CoreError::FamilyNotFound(_)
        | CoreError::RelationshipNotFound(_)
        | CoreError::PostNotFound(_)
        | CoreError::CommentNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidSubtype { .. } => StatusCode::BAD_REQUEST,
        CoreError::DuplicateRelationship(_, _) => StatusCode::CONFLICT,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
