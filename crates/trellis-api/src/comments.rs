//! Handlers for `/graphs/{id}/comments`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{store::GraphStore, view::CommentView};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content: String,
}

/// `POST /graphs/{id}/comments` — any authenticated user may comment on
/// any existing graph.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_graph(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("graph {id} not found")))?;

  let comment = state
    .store
    .add_comment(id, user.user_id, body.content)
    .await
    .map_err(ApiError::store)?;

  let view = CommentView {
    id:         comment.comment_id,
    content:    comment.content,
    created_at: comment.created_at,
    owner:      user.as_ref_view(),
  };
  Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub skip:  Option<u32>,
  pub limit: Option<u32>,
}

/// `GET /graphs/{id}/comments` — public, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CommentView>>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let comments = state
    .store
    .comments_for_graph(
      id,
      params.skip.unwrap_or(0),
      params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    )
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comments))
}
