//! Handlers for `/nodes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/nodes/{id}` | Public |
//! | `PATCH`  | `/nodes/{id}` | Owner of the containing graph only |
//! | `DELETE` | `/nodes/{id}` | Owner only; absent node still yields 204 |
//! | `POST`   | `/nodes/{id}/progress` | Mark learned (idempotent) |
//! | `DELETE` | `/nodes/{id}/progress` | Unmark learned (idempotent) |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use trellis_core::{
  graph::{Node, NodeUpdate},
  store::GraphStore,
  user::User,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `GET /nodes/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Node>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let node = state
    .store
    .get_node(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("node {id} not found")))?;
  Ok(Json(node))
}

/// `PATCH /nodes/{id}` — partial update; omitted fields are left untouched.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<NodeUpdate>,
) -> Result<Json<Node>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let node = state
    .store
    .get_node(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("node {id} not found")))?;

  check_node_owner(&state, &node, &user).await?;

  let updated = state
    .store
    .update_node(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("node {id} not found")))?;
  Ok(Json(updated))
}

/// `DELETE /nodes/{id}` — a missing node yields 204, the same as a
/// successful delete, so the response does not reveal which ids exist.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(node) = state.store.get_node(id).await.map_err(ApiError::store)?
  else {
    return Ok(StatusCode::NO_CONTENT);
  };

  check_node_owner(&state, &node, &user).await?;

  state.store.delete_node(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// `POST /nodes/{id}/progress` — any authenticated user may mark any
/// existing node as learned.
pub async fn mark_progress<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_node(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("node {id} not found")))?;

  state
    .store
    .mark_learned(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /nodes/{id}/progress`
pub async fn unmark_progress<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .unmark_learned(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Shared ──────────────────────────────────────────────────────────────────

/// 403 unless the caller owns the graph this node belongs to.
async fn check_node_owner<S>(
  state: &AppState<S>,
  node:  &Node,
  user:  &User,
) -> Result<(), ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let graph = state
    .store
    .get_graph(node.graph_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::Internal(format!("node {} has no graph row", node.node_id))
    })?;

  if graph.owner_id != user.user_id {
    return Err(ApiError::Forbidden(
      "only the graph owner may modify its nodes".to_string(),
    ));
  }
  Ok(())
}
