//! JSON REST API for Kindred.
//!
//! Exposes an axum [`Router`] backed by any
//! [`kindred_core::store::TreeStore`]. Caller identity arrives in trusted
//! headers (see [`auth`]); every authorization decision happens in
//! [`kindred_core::service::TreeService`], never in a handler.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kindred_api::api_router(service.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod families;
pub mod persons;
pub mod posts;
pub mod relationships;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use kindred_core::{service::TreeService, store::TreeStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
///
/// Every field has a default, so an absent file serves on
/// `127.0.0.1:8080` against `kindred.db`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("kindred.db") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(service: Arc<TreeService<S>>) -> Router<()>
where
  S: TreeStore + 'static,
{
  Router::new()
    // Families
    .route(
      "/families",
      get(families::list::<S>).post(families::create::<S>),
    )
    .route(
      "/families/{id}",
      get(families::get_one::<S>).delete(families::delete_one::<S>),
    )
    .route("/families/{id}/members", get(families::members::<S>))
    .route("/families/{id}/permissions", get(families::permissions::<S>))
    .route(
      "/families/{id}/permissions/{user_id}",
      put(families::put_permission::<S>)
        .delete(families::delete_permission::<S>),
    )
    .route(
      "/families/{id}/posts",
      get(posts::list::<S>).post(posts::create::<S>),
    )
    // Persons
    .route("/persons", post(persons::create::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>)
        .put(persons::update_one::<S>)
        .delete(persons::delete_one::<S>),
    )
    .route("/persons/{id}/parents", get(persons::parents::<S>))
    .route("/persons/{id}/children", get(persons::children::<S>))
    .route("/persons/{id}/spouses", get(persons::spouses::<S>))
    .route("/persons/{id}/siblings", get(persons::siblings::<S>))
    // Relationships
    .route("/relationships", post(relationships::create::<S>))
    .route("/relationships/bulk", post(relationships::create_bulk::<S>))
    .route(
      "/relationships/{id}",
      patch(relationships::update_one::<S>)
        .delete(relationships::delete_one::<S>),
    )
    // Comments
    .route(
      "/posts/{id}/comments",
      get(posts::comments::<S>).post(posts::add_comment::<S>),
    )
    .with_state(service)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use kindred_core::{
    ids::{PersonId, UserId},
    permission::Role,
  };
  use kindred_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(TreeService::new(Arc::new(store))))
  }

  fn member(id: UserId) -> Option<(UserId, Role)> {
    Some((id, Role::FamilyMember))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    identity: Option<(UserId, Role)>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = identity {
      builder = builder
        .header(auth::USER_ID_HEADER, id.to_string())
        .header(auth::USER_ROLE_HEADER, role.as_str());
    }
    let request = match body {
      Some(value) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create_person(app: &Router, user: UserId, first: &str) -> String {
    let (status, body) = send(
      app,
      "POST",
      "/persons",
      member(user),
      Some(json!({
        "first_name": first, "last_name": "Quinn", "gender": "other",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
  }

  async fn create_family(
    app: &Router,
    user: UserId,
    name: &str,
    is_public: bool,
  ) -> String {
    let (status, body) = send(
      app,
      "POST",
      "/families",
      member(user),
      Some(json!({ "name": name, "is_public": is_public })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
  }

  fn first_names(body: &Value) -> Vec<&str> {
    body
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["first_name"].as_str().unwrap())
      .collect()
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn mutations_require_an_identity() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/families", None, Some(json!({ "name": "Nope" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication required");
  }

  #[tokio::test]
  async fn admin_role_header_opens_private_families() {
    let app = app().await;
    let owner = UserId::new();
    let id = create_family(&app, owner, "Quiet", false).await;

    let stranger = UserId::new();
    let uri = format!("/families/{id}");
    let (status, _) = send(&app, "GET", &uri, member(stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
      send(&app, "GET", &uri, Some((stranger, Role::Admin)), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Families ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn family_lifecycle() {
    let app = app().await;
    let owner = UserId::new();
    let id = create_family(&app, owner, "Okafor", false).await;
    let uri = format!("/families/{id}");

    let (status, fetched) = send(&app, "GET", &uri, member(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Okafor");

    let (status, listed) =
      send(&app, "GET", "/families", member(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &uri, member(owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, member(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn family_privacy_follows_publication() {
    let app = app().await;
    let owner = UserId::new();
    let private = create_family(&app, owner, "Hidden", false).await;
    let public = create_family(&app, owner, "Open", true).await;

    let (status, _) =
      send(&app, "GET", &format!("/families/{private}"), None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) =
      send(&app, "GET", &format!("/families/{public}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, "GET", "/families", None, None).await;
    let names: Vec<&str> = listed
      .as_array()
      .unwrap()
      .iter()
      .map(|f| f["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, ["Open"]);
  }

  // ── Persons ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn person_crud_through_the_api() {
    let app = app().await;
    let owner = UserId::new();
    let id = create_person(&app, owner, "Imre").await;
    let uri = format!("/persons/{id}");

    // Unowned persons are visible to signed-in callers, not to anonymous.
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, fetched) = send(&app, "GET", &uri, member(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["first_name"], "Imre");

    let (status, renamed) = send(
      &app,
      "PUT",
      &uri,
      member(owner),
      Some(json!({ "first_name": "Imrus" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["first_name"], "Imrus");

    let (status, _) = send(&app, "DELETE", &uri, member(owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, member(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Relationships ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn parents_route_orders_father_first() {
    let app = app().await;
    let user = UserId::new();
    let child = create_person(&app, user, "Kit").await;
    let mother = create_person(&app, user, "Anna").await;
    let father = create_person(&app, user, "Zoltan").await;

    for (parent, subtype) in [(&mother, "mother"), (&father, "father")] {
      let (status, _) = send(
        &app,
        "POST",
        "/relationships",
        member(user),
        Some(json!({
          "person1_id": parent, "person2_id": child,
          "kind": "parent_child", "subtype": subtype,
        })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, parents) = send(
      &app,
      "GET",
      &format!("/persons/{child}/parents"),
      member(user),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first_names(&parents), ["Zoltan", "Anna"]);
  }

  #[tokio::test]
  async fn edge_errors_map_to_statuses() {
    let app = app().await;
    let user = UserId::new();
    let a = create_person(&app, user, "Aino").await;
    let b = create_person(&app, user, "Bjorn").await;

    let (status, body) = send(
      &app,
      "POST",
      "/relationships",
      member(user),
      Some(json!({
        "person1_id": a, "person2_id": b,
        "kind": "parent_child", "subtype": "brother",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("brother"));

    let (status, _) = send(
      &app,
      "POST",
      "/relationships",
      member(user),
      Some(json!({
        "person1_id": a, "person2_id": b,
        "kind": "spouse", "subtype": "wife",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
      &app,
      "POST",
      "/relationships",
      member(user),
      Some(json!({
        "person1_id": b, "person2_id": a,
        "kind": "spouse", "subtype": "husband",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
      &app,
      "POST",
      "/relationships",
      member(user),
      Some(json!({
        "person1_id": a, "person2_id": PersonId::new().to_string(),
        "kind": "sibling", "subtype": "sister",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn bulk_create_counts_duplicates_as_skipped() {
    let app = app().await;
    let user = UserId::new();
    let a = create_person(&app, user, "Ana").await;
    let b = create_person(&app, user, "Bela").await;
    let c = create_person(&app, user, "Cili").await;

    let (status, outcome) = send(
      &app,
      "POST",
      "/relationships/bulk",
      member(user),
      Some(json!({
        "relationships": [
          { "person1_id": a, "person2_id": b,
            "kind": "spouse", "subtype": "husband" },
          { "person1_id": b, "person2_id": a,
            "kind": "spouse", "subtype": "wife" },
          { "person1_id": a, "person2_id": c,
            "kind": "sibling", "subtype": "sister" },
        ],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["created"].as_array().unwrap().len(), 2);
    assert_eq!(outcome["skipped"], json!(1));

    let (status, _) = send(
      &app,
      "POST",
      "/relationships/bulk",
      member(user),
      Some(json!({
        "relationships": [
          { "person1_id": a, "person2_id": PersonId::new().to_string(),
            "kind": "sibling", "subtype": "brother" },
        ],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn relationship_update_and_delete() {
    let app = app().await;
    let user = UserId::new();
    let a = create_person(&app, user, "Dov").await;
    let b = create_person(&app, user, "Eva").await;

    let (status, view) = send(
      &app,
      "POST",
      "/relationships",
      member(user),
      Some(json!({
        "person1_id": a, "person2_id": b,
        "kind": "spouse", "subtype": "wife",
        "marriage_date": "1999-09-09",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = view["relationship"]["id"].as_str().unwrap().to_string();
    let uri = format!("/relationships/{id}");

    let (status, updated) = send(
      &app,
      "PATCH",
      &uri,
      member(user),
      Some(json!({
        "subtype": "ex_wife", "divorce_date": "2011-11-11",
        "is_active": false,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["subtype"], "ex_wife");
    assert_eq!(updated["is_active"], json!(false));
    assert_eq!(updated["marriage_date"], "1999-09-09");

    let (status, removed) = send(&app, "DELETE", &uri, member(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"].as_str().unwrap(), id);

    let (status, _) = send(&app, "DELETE", &uri, member(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Grants ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn grant_flow_controls_family_membership() {
    let app = app().await;
    let owner = UserId::new();
    let helper = UserId::new();
    let family = create_family(&app, owner, "Moreau", false).await;

    let new_member = json!({
      "first_name": "Luc", "last_name": "Moreau", "gender": "male",
      "family_id": family,
    });
    let (status, _) =
      send(&app, "POST", "/persons", member(helper), Some(new_member.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let grant_uri = format!("/families/{family}/permissions/{helper}");
    let (status, grant) = send(
      &app,
      "PUT",
      &grant_uri,
      member(owner),
      Some(json!({ "level": "edit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grant["level"], "edit");

    let (status, created) =
      send(&app, "POST", "/persons", member(helper), Some(new_member)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["family_id"], json!(family));

    let (status, members) = send(
      &app,
      "GET",
      &format!("/families/{family}/members"),
      member(owner),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first_names(&members), ["Luc"]);

    let (status, grants) = send(
      &app,
      "GET",
      &format!("/families/{family}/permissions"),
      member(owner),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grants.as_array().unwrap().len(), 2);

    let (status, _) =
      send(&app, "DELETE", &grant_uri, member(owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
      &app,
      "POST",
      "/persons",
      member(helper),
      Some(json!({
        "first_name": "No", "last_name": "Entry", "gender": "female",
        "family_id": family,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  // ── Posts & comments ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_visibility_and_comments_flow() {
    let app = app().await;
    let owner = UserId::new();
    let family = create_family(&app, owner, "Banerjee", false).await;
    let posts_uri = format!("/families/{family}/posts");

    let mut family_post = String::new();
    for (content, visibility) in [
      ("hello world", "public"),
      ("family dinner", "family"),
      ("admin notes", "admin"),
    ] {
      let (status, post) = send(
        &app,
        "POST",
        &posts_uri,
        member(owner),
        Some(json!({ "content": content, "visibility": visibility })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
      if visibility == "family" {
        family_post = post["id"].as_str().unwrap().to_string();
      }
    }

    let (_, anonymous) = send(&app, "GET", &posts_uri, None, None).await;
    assert_eq!(anonymous.as_array().unwrap().len(), 1);
    let (_, owned) = send(&app, "GET", &posts_uri, member(owner), None).await;
    assert_eq!(owned.as_array().unwrap().len(), 3);

    let comments_uri = format!("/posts/{family_post}/comments");
    let (status, _) = send(
      &app,
      "POST",
      &comments_uri,
      member(owner),
      Some(json!({ "content": "I'll be there" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Anonymous readers cannot see a family-visibility post's thread.
    let (status, _) = send(&app, "GET", &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, comments) =
      send(&app, "GET", &comments_uri, member(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["content"], "I'll be there");
  }
}
