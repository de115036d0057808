//! The `GraphStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `trellis-store-sqlite`). The HTTP layer (`trellis-api`) depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  graph::{
    Comment, Edge, Graph, NewEdge, NewGraph, NewNode, Node, NodeUpdate,
  },
  rating::{RatingCounts, RatingValue},
  user::{NewUser, User},
  view::{CommentView, GraphPage, GraphSummary},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort order for [`GraphStore::list_graphs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  /// Newest first (default).
  #[default]
  DateDesc,
  /// Net rating (likes - dislikes) descending; ties newest first.
  RatingDesc,
}

/// Parameters for [`GraphStore::list_graphs`].
///
/// Filtering and sorting are applied before pagination, never after. The
/// search term is a case-insensitive substring match over graph name and
/// description; length validation is the API layer's concern.
#[derive(Debug, Clone, Default)]
pub struct GraphQuery {
  pub skip:   u32,
  pub limit:  u32,
  pub sort:   SortOrder,
  pub search: Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Trellis storage backend.
///
/// Every mutating operation is a single request-scoped unit of work; the
/// trait promises no atomicity beyond what the backend's single-statement
/// operations provide. All methods return `Send` futures so the trait can
/// be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GraphStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. The password hash is supplied by the
  /// caller. Fails if the username is already taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up a user by username. Returns `None` if not found.
  fn user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Look up a user by UUID. Returns `None` if not found.
  fn user_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Graphs ────────────────────────────────────────────────────────────

  /// Create and persist a graph owned by `owner_id`.
  fn add_graph(
    &self,
    owner_id: Uuid,
    input: NewGraph,
  ) -> impl Future<Output = Result<Graph, Self::Error>> + Send + '_;

  /// Retrieve a graph by UUID. Returns `None` if not found.
  fn get_graph(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Graph>, Self::Error>> + Send + '_;

  /// Retrieve a graph together with all of its nodes and edges.
  fn graph_contents(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<(Graph, Vec<Node>, Vec<Edge>)>, Self::Error>>
  + Send
  + '_;

  /// Paginated, filtered, sorted listing with per-graph vote aggregates.
  ///
  /// The returned `total` counts the full matching set regardless of
  /// pagination.
  fn list_graphs<'a>(
    &'a self,
    query: &'a GraphQuery,
  ) -> impl Future<Output = Result<GraphPage, Self::Error>> + Send + 'a;

  /// All graphs owned by `user_id`, newest first, with vote aggregates.
  fn owned_graphs(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GraphSummary>, Self::Error>> + Send + '_;

  /// Graphs in which `user_id` has learned at least one node, newest
  /// first, with vote aggregates.
  fn learning_graphs(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GraphSummary>, Self::Error>> + Send + '_;

  // ── Nodes ─────────────────────────────────────────────────────────────

  fn add_node(
    &self,
    graph_id: Uuid,
    input: NewNode,
  ) -> impl Future<Output = Result<Node, Self::Error>> + Send + '_;

  fn get_node(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Node>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the node does not exist.
  fn update_node(
    &self,
    id: Uuid,
    patch: NodeUpdate,
  ) -> impl Future<Output = Result<Option<Node>, Self::Error>> + Send + '_;

  /// Delete a node and (via cascade) its edges and progress marks.
  /// Deleting an absent node is a no-op, not an error.
  fn delete_node(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Edges ─────────────────────────────────────────────────────────────

  fn add_edge(
    &self,
    graph_id: Uuid,
    input: NewEdge,
  ) -> impl Future<Output = Result<Edge, Self::Error>> + Send + '_;

  fn get_edge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Edge>, Self::Error>> + Send + '_;

  /// Deleting an absent edge is a no-op, not an error.
  fn delete_edge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Ratings ───────────────────────────────────────────────────────────

  /// Toggle/update the vote keyed by (user, graph):
  /// no row → insert; same value → delete (retraction); different value →
  /// overwrite in place.
  fn rate_graph(
    &self,
    user_id: Uuid,
    graph_id: Uuid,
    value: RatingValue,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Like/dislike counts for one graph. Zeros when no votes exist.
  fn graph_ratings(
    &self,
    graph_id: Uuid,
  ) -> impl Future<Output = Result<RatingCounts, Self::Error>> + Send + '_;

  /// The vote `user_id` cast on `graph_id`, if any. `None` means no
  /// opinion — callers surface it as the 0 sentinel.
  fn user_vote(
    &self,
    user_id: Uuid,
    graph_id: Uuid,
  ) -> impl Future<Output = Result<Option<RatingValue>, Self::Error>> + Send + '_;

  /// Totals *received* across all graphs owned by `user_id` — not votes
  /// the user has given.
  fn received_ratings(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<RatingCounts, Self::Error>> + Send + '_;

  // ── Progress ──────────────────────────────────────────────────────────

  /// Idempotent: marking an already-learned node is a no-op.
  fn mark_learned(
    &self,
    user_id: Uuid,
    node_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Idempotent: unmarking a never-learned node is a no-op.
  fn unmark_learned(
    &self,
    user_id: Uuid,
    node_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Node ids that are both learned by `user_id` and members of
  /// `graph_id` — the intersection of the two sets.
  fn learned_in_graph(
    &self,
    user_id: Uuid,
    graph_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    graph_id: Uuid,
    owner_id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments on a graph, newest first, paginated. An unknown graph yields
  /// an empty list.
  fn comments_for_graph(
    &self,
    graph_id: Uuid,
    skip: u32,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<CommentView>, Self::Error>> + Send + '_;
}
