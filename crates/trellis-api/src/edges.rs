//! Handler for `DELETE /edges/{id}`.

use axum::{
  extract::{Path, State},
  http::StatusCode,
};
use trellis_core::store::GraphStore;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `DELETE /edges/{id}` — owner of the containing graph only. A missing
/// edge yields 204, the same as a successful delete, so the response does
/// not reveal which ids exist.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(edge) = state.store.get_edge(id).await.map_err(ApiError::store)?
  else {
    return Ok(StatusCode::NO_CONTENT);
  };

  let graph = state
    .store
    .get_graph(edge.graph_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::Internal(format!("edge {id} has no graph row"))
    })?;

  if graph.owner_id != user.user_id {
    return Err(ApiError::Forbidden(
      "only the graph owner may modify its edges".to_string(),
    ));
  }

  state.store.delete_edge(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
