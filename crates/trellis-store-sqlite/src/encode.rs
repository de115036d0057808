//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (lexicographic order is
//! chronological order, which the listing queries rely on). UUIDs are
//! stored as hyphenated lowercase strings. Rating values are INTEGER
//! columns restricted to 1 / -1 by a CHECK constraint.

use chrono::{DateTime, Utc};
use trellis_core::{
  graph::{Edge, Graph, Node},
  rating::RatingValue,
  user::{User, UserRef},
  view::{CommentView, GraphSummary},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RatingValue ─────────────────────────────────────────────────────────────

pub fn decode_rating(v: i64) -> Result<RatingValue> {
  Ok(RatingValue::from_i64(v)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
    })
  }
}

/// Raw strings read directly from a `graphs` row.
pub struct RawGraph {
  pub graph_id:    String,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
  pub owner_id:    String,
}

impl RawGraph {
  pub fn into_graph(self) -> Result<Graph> {
    Ok(Graph {
      graph_id:    decode_uuid(&self.graph_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      owner_id:    decode_uuid(&self.owner_id)?,
    })
  }
}

/// Raw row from a `graphs` join with `users` and the rating aggregate.
pub struct RawGraphSummary {
  pub graph_id:    String,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
  pub owner_id:    String,
  pub owner_name:  String,
  pub likes:       i64,
  pub dislikes:    i64,
}

impl RawGraphSummary {
  pub fn into_summary(self) -> Result<GraphSummary> {
    Ok(GraphSummary {
      id:          decode_uuid(&self.graph_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      owner:       UserRef {
        id:       decode_uuid(&self.owner_id)?,
        username: self.owner_name,
      },
      likes:       self.likes,
      dislikes:    self.dislikes,
    })
  }
}

/// Raw strings read directly from a `nodes` row.
pub struct RawNode {
  pub node_id:    String,
  pub name:       String,
  pub content:    String,
  pub position_x: f64,
  pub position_y: f64,
  pub graph_id:   String,
}

impl RawNode {
  pub fn into_node(self) -> Result<Node> {
    Ok(Node {
      node_id:    decode_uuid(&self.node_id)?,
      name:       self.name,
      content:    self.content,
      position_x: self.position_x,
      position_y: self.position_y,
      graph_id:   decode_uuid(&self.graph_id)?,
    })
  }
}

/// Raw strings read directly from an `edges` row.
pub struct RawEdge {
  pub edge_id:        String,
  pub graph_id:       String,
  pub source_node_id: String,
  pub target_node_id: String,
}

impl RawEdge {
  pub fn into_edge(self) -> Result<Edge> {
    Ok(Edge {
      edge_id:        decode_uuid(&self.edge_id)?,
      graph_id:       decode_uuid(&self.graph_id)?,
      source_node_id: decode_uuid(&self.source_node_id)?,
      target_node_id: decode_uuid(&self.target_node_id)?,
    })
  }
}

/// Raw row from a `comments` join with `users`.
pub struct RawCommentView {
  pub comment_id: String,
  pub content:    String,
  pub created_at: String,
  pub owner_id:   String,
  pub owner_name: String,
}

impl RawCommentView {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      id:         decode_uuid(&self.comment_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      owner:      UserRef {
        id:       decode_uuid(&self.owner_id)?,
        username: self.owner_name,
      },
    })
  }
}
