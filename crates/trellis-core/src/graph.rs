//! Graph, node, edge, and comment entities.
//!
//! A graph is a named collection of nodes and edges owned by one user.
//! Nodes carry content and 2D layout coordinates; edges are directed
//! relations between two nodes of the same graph. Entities are built
//! through explicit `New*` input types — there is no field-map construction
//! and unknown fields are rejected at the API boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Graph ───────────────────────────────────────────────────────────────────

/// A named collection of nodes and edges. Deleting a graph cascades to its
/// nodes, edges, comments, and ratings at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
  pub graph_id:    Uuid,
  pub name:        String,
  pub description: Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:  DateTime<Utc>,
  pub owner_id:    Uuid,
}

/// Input to [`crate::store::GraphStore::add_graph`].
#[derive(Debug, Clone)]
pub struct NewGraph {
  pub name:        String,
  pub description: Option<String>,
}

// ─── Node ────────────────────────────────────────────────────────────────────

/// A content unit with 2D layout coordinates, belonging to exactly one
/// graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
  pub node_id:    Uuid,
  pub name:       String,
  pub content:    String,
  pub position_x: f64,
  pub position_y: f64,
  pub graph_id:   Uuid,
}

/// Input to [`crate::store::GraphStore::add_node`].
#[derive(Debug, Clone)]
pub struct NewNode {
  pub name:       String,
  pub content:    String,
  pub position_x: f64,
  pub position_y: f64,
}

impl NewNode {
  /// Convenience constructor: empty content at the origin.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name:       name.into(),
      content:    String::new(),
      position_x: 0.0,
      position_y: 0.0,
    }
  }
}

/// Partial update for a node. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeUpdate {
  pub name:       Option<String>,
  pub content:    Option<String>,
  pub position_x: Option<f64>,
  pub position_y: Option<f64>,
}

impl NodeUpdate {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.content.is_none()
      && self.position_x.is_none()
      && self.position_y.is_none()
  }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

/// A directed relation between two nodes within the same graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
  pub edge_id:        Uuid,
  pub graph_id:       Uuid,
  pub source_node_id: Uuid,
  pub target_node_id: Uuid,
}

/// Input to [`crate::store::GraphStore::add_edge`]. Both endpoints must
/// belong to the graph the edge is created under; the API layer verifies
/// this before insert.
#[derive(Debug, Clone)]
pub struct NewEdge {
  pub source_node_id: Uuid,
  pub target_node_id: Uuid,
}

// ─── Comment ─────────────────────────────────────────────────────────────────

/// A comment on a graph. Append-only — there is no update operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub owner_id:   Uuid,
  pub graph_id:   Uuid,
}
