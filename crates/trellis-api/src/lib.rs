//! HTTP layer for Trellis.
//!
//! Exposes an axum [`Router`] serving the JSON API under `/api/v1`, backed
//! by any [`GraphStore`]. Authentication is stateless: argon2 password
//! hashes at rest, short-lived HS256 bearer tokens on the wire.

pub mod auth;
pub mod comments;
pub mod edges;
pub mod error;
pub mod graphs;
pub mod nodes;
pub mod users;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use trellis_core::store::GraphStore;

use auth::AuthKeys;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_token_ttl() -> i64 { 30 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// HS256 signing secret for access tokens.
  pub secret_key: String,
  #[serde(default = "default_token_ttl")]
  pub token_ttl_minutes: i64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: GraphStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthKeys>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] serving the API under `/api/v1`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = Router::new()
    .route("/users/register",      post(users::register::<S>))
    .route("/users/login/token",   post(users::login::<S>))
    .route("/users/me/profile",    get(users::profile::<S>))
    .route(
      "/graphs",
      get(graphs::list::<S>).post(graphs::create::<S>),
    )
    .route("/graphs/{id}",         get(graphs::detail::<S>))
    .route("/graphs/{id}/nodes",   post(graphs::create_node::<S>))
    .route("/graphs/{id}/edges",   post(graphs::create_edge::<S>))
    .route("/graphs/{id}/rate",    post(graphs::rate::<S>))
    .route(
      "/graphs/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route(
      "/nodes/{id}",
      get(nodes::get_one::<S>)
        .patch(nodes::update::<S>)
        .delete(nodes::delete::<S>),
    )
    .route(
      "/nodes/{id}/progress",
      post(nodes::mark_progress::<S>).delete(nodes::unmark_progress::<S>),
    )
    .route("/edges/{id}",          delete(edges::delete::<S>))
    .with_state(state);

  Router::new()
    .nest("/api/v1", api)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use trellis_store_sqlite::SqliteStore;
  use uuid::Uuid;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:              "127.0.0.1".to_string(),
        port:              8000,
        store_path:        PathBuf::from(":memory:"),
        secret_key:        "test-secret".to_string(),
        token_ttl_minutes: 30,
      }),
      auth: Arc::new(AuthKeys::new("test-secret", 30)),
    }
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  /// Register a user and log in through the API; returns the bearer token.
  async fn signup(state: &AppState<SqliteStore>, username: &str) -> String {
    let resp = send(
      state,
      "POST",
      "/api/v1/users/register",
      None,
      Some(json!({ "username": username, "password": "hunter22" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let form = format!("username={username}&password=hunter22");
    let req = Request::builder()
      .method("POST")
      .uri("/api/v1/users/login/token")
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(form))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["token_type"], "bearer");
    json["access_token"].as_str().unwrap().to_string()
  }

  async fn create_graph(
    state: &AppState<SqliteStore>,
    token: &str,
    name:  &str,
  ) -> Uuid {
    let resp = send(
      state,
      "POST",
      "/api/v1/graphs",
      Some(token),
      Some(json!({ "name": name, "description": "test graph" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    json["id"].as_str().unwrap().parse().unwrap()
  }

  async fn create_node(
    state:    &AppState<SqliteStore>,
    token:    &str,
    graph_id: Uuid,
    name:     &str,
  ) -> Uuid {
    let resp = send(
      state,
      "POST",
      &format!("/api/v1/graphs/{graph_id}/nodes"),
      Some(token),
      Some(json!({ "name": name, "position_x": 1.0, "position_y": 2.0 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    json["node_id"].as_str().unwrap().parse().unwrap()
  }

  // ── Registration and login ──────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_public_identity_only() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/api/v1/users/register",
      None,
      Some(json!({ "username": "alice", "password": "hunter22" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["username"], "alice");
    assert!(json.get("password_hash").is_none(), "hash leaked: {json}");
  }

  #[tokio::test]
  async fn duplicate_username_is_bad_request() {
    let state = make_state().await;
    signup(&state, "alice").await;
    let resp = send(
      &state,
      "POST",
      "/api/v1/users/register",
      None,
      Some(json!({ "username": "alice", "password": "different1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn short_password_is_bad_request() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/api/v1/users/register",
      None,
      Some(json!({ "username": "alice", "password": "short" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn wrong_password_is_unauthorized() {
    let state = make_state().await;
    signup(&state, "alice").await;

    let req = Request::builder()
      .method("POST")
      .uri("/api/v1/users/login/token")
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from("username=alice&password=wrong1"))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  // ── Listing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn listing_is_public_and_counts_total() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    create_graph(&state, &token, "Chemistry").await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    create_graph(&state, &token, "Physics").await;

    let resp = send(&state, "GET", "/api/v1/graphs?limit=1", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["graphs"].as_array().unwrap().len(), 1);
    // Newest first.
    assert_eq!(json["graphs"][0]["name"], "Physics");
    assert_eq!(json["graphs"][0]["owner"]["username"], "alice");
  }

  #[tokio::test]
  async fn short_search_term_is_bad_request() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/api/v1/graphs?search=ab", None, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Detail ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_graph_detail_is_not_found() {
    let state = make_state().await;
    let id    = Uuid::new_v4();
    let resp  = send(&state, "GET", &format!("/api/v1/graphs/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn anonymous_detail_has_empty_overlay() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    let graph = create_graph(&state, &token, "Chemistry").await;
    create_node(&state, &token, graph, "Atoms").await;

    let resp = send(&state, "GET", &format!("/api/v1/graphs/{graph}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["my_vote"], 0);
    assert_eq!(json["learned_node_ids"].as_array().unwrap().len(), 0);
    assert_eq!(json["elements"][0]["group"], "nodes");
    assert_eq!(json["elements"][0]["data"]["label"], "Atoms");
  }

  #[tokio::test]
  async fn authenticated_detail_carries_vote_and_progress() {
    let state   = make_state().await;
    let owner   = signup(&state, "alice").await;
    let learner = signup(&state, "bob").await;
    let graph   = create_graph(&state, &owner, "Chemistry").await;
    let node    = create_node(&state, &owner, graph, "Atoms").await;

    let resp = send(
      &state,
      "POST",
      &format!("/api/v1/graphs/{graph}/rate"),
      Some(&learner),
      Some(json!({ "value": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
      &state,
      "POST",
      &format!("/api/v1/nodes/{node}/progress"),
      Some(&learner),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
      &state,
      "GET",
      &format!("/api/v1/graphs/{graph}"),
      Some(&learner),
      None,
    )
    .await;
    let json = body_json(resp).await;
    assert_eq!(json["my_vote"], 1);
    assert_eq!(json["likes"], 1);
    assert_eq!(json["learned_node_ids"][0], node.to_string());
  }

  // ── Authorisation ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_graph_requires_token() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/api/v1/graphs",
      None,
      Some(json!({ "name": "Chemistry" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn non_owner_cannot_add_nodes() {
    let state = make_state().await;
    let owner = signup(&state, "alice").await;
    let other = signup(&state, "bob").await;
    let graph = create_graph(&state, &owner, "Chemistry").await;

    let resp = send(
      &state,
      "POST",
      &format!("/api/v1/graphs/{graph}/nodes"),
      Some(&other),
      Some(json!({ "name": "Intruder" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn owner_cannot_rate_own_graph() {
    let state = make_state().await;
    let owner = signup(&state, "alice").await;
    let graph = create_graph(&state, &owner, "Chemistry").await;

    let resp = send(
      &state,
      "POST",
      &format!("/api/v1/graphs/{graph}/rate"),
      Some(&owner),
      Some(json!({ "value": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Edges ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cross_graph_edge_is_rejected() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    let g1    = create_graph(&state, &token, "Chemistry").await;
    let g2    = create_graph(&state, &token, "Physics").await;
    let n1    = create_node(&state, &token, g1, "Atoms").await;
    let n2    = create_node(&state, &token, g2, "Gravity").await;

    let resp = send(
      &state,
      "POST",
      &format!("/api/v1/graphs/{g1}/edges"),
      Some(&token),
      Some(json!({ "source_node_id": n1, "target_node_id": n2 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn edge_within_graph_is_created() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    let graph = create_graph(&state, &token, "Chemistry").await;
    let n1    = create_node(&state, &token, graph, "Atoms").await;
    let n2    = create_node(&state, &token, graph, "Molecules").await;

    let resp = send(
      &state,
      "POST",
      &format!("/api/v1/graphs/{graph}/edges"),
      Some(&token),
      Some(json!({ "source_node_id": n1, "target_node_id": n2 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["source_node_id"], n1.to_string());
    assert_eq!(json["target_node_id"], n2.to_string());
  }

  // ── Deletes ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn deleting_absent_node_returns_no_content() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    let id    = Uuid::new_v4();

    let resp = send(
      &state,
      "DELETE",
      &format!("/api/v1/nodes/{id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn non_owner_cannot_delete_node() {
    let state = make_state().await;
    let owner = signup(&state, "alice").await;
    let other = signup(&state, "bob").await;
    let graph = create_graph(&state, &owner, "Chemistry").await;
    let node  = create_node(&state, &owner, graph, "Atoms").await;

    let resp = send(
      &state,
      "DELETE",
      &format!("/api/v1/nodes/{node}"),
      Some(&other),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Node update ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_updates_only_named_fields() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    let graph = create_graph(&state, &token, "Chemistry").await;
    let node  = create_node(&state, &token, graph, "Atoms").await;

    let resp = send(
      &state,
      "PATCH",
      &format!("/api/v1/nodes/{node}"),
      Some(&token),
      Some(json!({ "name": "Molecules" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["name"], "Molecules");
    assert_eq!(json["position_x"], 1.0);
  }

  // ── Comments ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comments_round_trip_newest_first() {
    let state = make_state().await;
    let token = signup(&state, "alice").await;
    let graph = create_graph(&state, &token, "Chemistry").await;

    for text in ["first", "second"] {
      let resp = send(
        &state,
        "POST",
        &format!("/api/v1/graphs/{graph}/comments"),
        Some(&token),
        Some(json!({ "content": text })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
      tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let resp = send(
      &state,
      "GET",
      &format!("/api/v1/graphs/{graph}/comments"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["content"], "second");
    assert_eq!(list[0]["owner"]["username"], "alice");
  }

  // ── Profile ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_requires_token() {
    let state = make_state().await;
    let resp  = send(&state, "GET", "/api/v1/users/me/profile", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn profile_reports_received_votes_and_graph_lists() {
    let state   = make_state().await;
    let owner   = signup(&state, "alice").await;
    let learner = signup(&state, "bob").await;
    let graph   = create_graph(&state, &owner, "Chemistry").await;
    let node    = create_node(&state, &owner, graph, "Atoms").await;

    send(
      &state,
      "POST",
      &format!("/api/v1/graphs/{graph}/rate"),
      Some(&learner),
      Some(json!({ "value": 1 })),
    )
    .await;
    send(
      &state,
      "POST",
      &format!("/api/v1/nodes/{node}/progress"),
      Some(&learner),
      None,
    )
    .await;

    let resp = send(&state, "GET", "/api/v1/users/me/profile", Some(&owner), None).await;
    let json = body_json(resp).await;
    assert_eq!(json["username"], "alice");
    assert_eq!(json["total_likes"], 1);
    assert_eq!(json["owned_graphs"].as_array().unwrap().len(), 1);
    assert_eq!(json["learning_graphs"].as_array().unwrap().len(), 0);

    let resp = send(&state, "GET", "/api/v1/users/me/profile", Some(&learner), None).await;
    let json = body_json(resp).await;
    assert_eq!(json["total_likes"], 0);
    assert_eq!(json["owned_graphs"].as_array().unwrap().len(), 0);
    assert_eq!(json["learning_graphs"][0]["name"], "Chemistry");
  }
}
