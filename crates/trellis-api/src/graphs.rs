//! Handlers for `/graphs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/graphs` | `?skip=&limit=&sort_by=date_desc\|rating_desc&search=` |
//! | `POST` | `/graphs` | Requires a bearer token |
//! | `GET`  | `/graphs/{id}` | Public; overlay fields filled when authenticated |
//! | `POST` | `/graphs/{id}/nodes` | Owner only |
//! | `POST` | `/graphs/{id}/edges` | Owner only; endpoints must belong to the graph |
//! | `POST` | `/graphs/{id}/rate` | Voting on your own graph is forbidden |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{
  graph::{Edge, Graph, NewEdge, NewGraph, NewNode, Node},
  rating::RatingValue,
  store::{GraphQuery, GraphStore, SortOrder},
  user::User,
  view::{GraphDetail, GraphPage, GraphSummary},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{CurrentUser, MaybeUser},
  error::ApiError,
};

/// Search term length bounds. Outside these the request is rejected rather
/// than silently returning an unfiltered or empty listing.
const SEARCH_LEN: std::ops::RangeInclusive<usize> = 3..=50;

const DEFAULT_PAGE_LIMIT: u32 = 10;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
  #[default]
  DateDesc,
  RatingDesc,
}

impl From<SortBy> for SortOrder {
  fn from(sort: SortBy) -> Self {
    match sort {
      SortBy::DateDesc => SortOrder::DateDesc,
      SortBy::RatingDesc => SortOrder::RatingDesc,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub skip:    Option<u32>,
  pub limit:   Option<u32>,
  pub sort_by: Option<SortBy>,
  pub search:  Option<String>,
}

/// `GET /graphs`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<GraphPage>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if let Some(term) = &params.search
    && !SEARCH_LEN.contains(&term.chars().count())
  {
    return Err(ApiError::BadRequest(
      "search term must be between 3 and 50 characters".to_string(),
    ));
  }

  let query = GraphQuery {
    skip:   params.skip.unwrap_or(0),
    limit:  params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    sort:   params.sort_by.unwrap_or_default().into(),
    search: params.search,
  };

  let page = state
    .store
    .list_graphs(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateGraphBody {
  pub name:        String,
  pub description: Option<String>,
}

/// `POST /graphs`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<CreateGraphBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let graph = state
    .store
    .add_graph(
      user.user_id,
      NewGraph { name: body.name, description: body.description },
    )
    .await
    .map_err(ApiError::store)?;

  let summary = GraphSummary::unrated(graph, user.as_ref_view());
  Ok((StatusCode::CREATED, Json(summary)))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// `GET /graphs/{id}` — public, with a per-user overlay (learned nodes,
/// own vote) when a valid bearer token is supplied.
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  maybe_user: MaybeUser,
  Path(id): Path<Uuid>,
) -> Result<Json<GraphDetail>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let (graph, nodes, edges) = state
    .store
    .graph_contents(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("graph {id} not found")))?;

  let owner = state
    .store
    .user_by_id(graph.owner_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Internal(format!("graph {id} has no owner row")))?;

  let ratings = state
    .store
    .graph_ratings(id)
    .await
    .map_err(ApiError::store)?;

  let (learned, my_vote) = match &maybe_user {
    MaybeUser::Authenticated(user) => {
      let learned = state
        .store
        .learned_in_graph(user.user_id, id)
        .await
        .map_err(ApiError::store)?;
      let vote = state
        .store
        .user_vote(user.user_id, id)
        .await
        .map_err(ApiError::store)?;
      (learned, vote)
    }
    MaybeUser::Anonymous => (Vec::new(), None),
  };

  Ok(Json(GraphDetail::assemble(
    graph,
    owner.as_ref_view(),
    &nodes,
    &edges,
    ratings,
    learned,
    my_vote,
  )))
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateNodeBody {
  pub name:       String,
  #[serde(default)]
  pub content:    String,
  #[serde(default)]
  pub position_x: f64,
  #[serde(default)]
  pub position_y: f64,
}

/// `POST /graphs/{id}/nodes` — owner only.
pub async fn create_node<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateNodeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_graph(&state, id, &user).await?;

  let node = state
    .store
    .add_node(
      id,
      NewNode {
        name:       body.name,
        content:    body.content,
        position_x: body.position_x,
        position_y: body.position_y,
      },
    )
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(node)))
}

// ─── Edges ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateEdgeBody {
  pub source_node_id: Uuid,
  pub target_node_id: Uuid,
}

/// `POST /graphs/{id}/edges` — owner only. Both endpoint nodes must exist
/// and belong to this graph; a cross-graph edge is rejected with 400.
pub async fn create_edge<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateEdgeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_graph(&state, id, &user).await?;

  endpoint_in_graph(&state, id, body.source_node_id, "source").await?;
  endpoint_in_graph(&state, id, body.target_node_id, "target").await?;

  let edge = state
    .store
    .add_edge(
      id,
      NewEdge {
        source_node_id: body.source_node_id,
        target_node_id: body.target_node_id,
      },
    )
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json::<Edge>(edge)))
}

async fn endpoint_in_graph<S>(
  state:    &AppState<S>,
  graph_id: Uuid,
  node_id:  Uuid,
  role:     &str,
) -> Result<Node, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let node = state
    .store
    .get_node(node_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::BadRequest(format!("{role} node {node_id} does not exist"))
    })?;
  if node.graph_id != graph_id {
    return Err(ApiError::BadRequest(format!(
      "{role} node {node_id} belongs to a different graph"
    )));
  }
  Ok(node)
}

// ─── Rating ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RateBody {
  pub value: RatingValue,
}

/// `POST /graphs/{id}/rate` — casting the same value twice retracts the
/// vote; a different value overwrites it.
pub async fn rate<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<RateBody>,
) -> Result<StatusCode, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let graph = state
    .store
    .get_graph(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("graph {id} not found")))?;

  if graph.owner_id == user.user_id {
    return Err(ApiError::Forbidden(
      "cannot rate your own graph".to_string(),
    ));
  }

  state
    .store
    .rate_graph(user.user_id, id, body.value)
    .await
    .map_err(ApiError::store)?;

  Ok(StatusCode::NO_CONTENT)
}

// ─── Shared ──────────────────────────────────────────────────────────────────

/// Fetch a graph and verify the caller owns it: 404 when it does not exist,
/// 403 when it belongs to someone else.
pub(crate) async fn owned_graph<S>(
  state: &AppState<S>,
  id:    Uuid,
  user:  &User,
) -> Result<Graph, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let graph = state
    .store
    .get_graph(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("graph {id} not found")))?;

  if graph.owner_id != user.user_id {
    return Err(ApiError::Forbidden(
      "only the graph owner may modify it".to_string(),
    ));
  }
  Ok(graph)
}
