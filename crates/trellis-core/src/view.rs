//! Derived read models — never stored, always computed at query time.
//!
//! Summaries pair a graph with its owner and aggregated vote counts. The
//! detail view additionally flattens nodes and edges into generic elements
//! for a visualisation layer, with optional per-user overlays (learned
//! nodes, own vote).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  graph::{Edge, Graph, Node},
  rating::{RatingCounts, RatingValue},
  user::UserRef,
};

// ─── Listing ─────────────────────────────────────────────────────────────────

/// One row of a graph listing: the graph, its owner, and its vote counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSummary {
  pub id:          Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
  pub owner:       UserRef,
  pub likes:       i64,
  pub dislikes:    i64,
}

impl GraphSummary {
  /// Summary for a freshly-created graph — no votes yet.
  pub fn unrated(graph: Graph, owner: UserRef) -> Self {
    Self {
      id:          graph.graph_id,
      name:        graph.name,
      description: graph.description,
      created_at:  graph.created_at,
      owner,
      likes:       0,
      dislikes:    0,
    }
  }
}

/// A page of graph summaries. `total` is the size of the full matching set,
/// independent of pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPage {
  pub total:  i64,
  pub graphs: Vec<GraphSummary>,
}

// ─── Detail elements ─────────────────────────────────────────────────────────

/// 2D layout position of a node element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeElement {
  /// Stringified node UUID — the visualisation layer requires string ids.
  pub id:    String,
  pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeElement {
  pub id:     String,
  pub source: String,
  pub target: String,
}

/// A generic graph element in the shape the visualisation layer consumes:
/// `{"group":"nodes"|"edges", "data":{...}, "position":{...}?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "group", rename_all = "lowercase")]
pub enum GraphElement {
  Nodes { data: NodeElement, position: Position },
  Edges { data: EdgeElement },
}

/// Flatten nodes and edges into visualisation elements, nodes first.
pub fn assemble_elements(nodes: &[Node], edges: &[Edge]) -> Vec<GraphElement> {
  let mut elements = Vec::with_capacity(nodes.len() + edges.len());

  for node in nodes {
    elements.push(GraphElement::Nodes {
      data:     NodeElement {
        id:    node.node_id.to_string(),
        label: node.name.clone(),
      },
      position: Position { x: node.position_x, y: node.position_y },
    });
  }

  for edge in edges {
    elements.push(GraphElement::Edges {
      data: EdgeElement {
        id:     edge.edge_id.to_string(),
        source: edge.source_node_id.to_string(),
        target: edge.target_node_id.to_string(),
      },
    });
  }

  elements
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// The full read model for one graph, including the per-user overlay.
/// For anonymous readers `learned_node_ids` is empty and `my_vote` is 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDetail {
  pub id:               Uuid,
  pub name:             String,
  pub description:      Option<String>,
  pub created_at:       DateTime<Utc>,
  pub owner:            UserRef,
  pub elements:         Vec<GraphElement>,
  pub learned_node_ids: Vec<Uuid>,
  pub likes:            i64,
  pub dislikes:         i64,
  /// 1, -1, or 0. The 0 is a derived "no opinion" sentinel — it is never a
  /// persisted rating value.
  pub my_vote:          i64,
}

impl GraphDetail {
  pub fn assemble(
    graph: Graph,
    owner: UserRef,
    nodes: &[Node],
    edges: &[Edge],
    ratings: RatingCounts,
    learned_node_ids: Vec<Uuid>,
    my_vote: Option<RatingValue>,
  ) -> Self {
    Self {
      id:               graph.graph_id,
      name:             graph.name,
      description:      graph.description,
      created_at:       graph.created_at,
      owner,
      elements:         assemble_elements(nodes, edges),
      learned_node_ids,
      likes:            ratings.likes,
      dislikes:         ratings.dislikes,
      my_vote:          my_vote.map(RatingValue::as_i64).unwrap_or(0),
    }
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// A comment paired with its author's public identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  pub id:         Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub owner:      UserRef,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The authenticated user's profile: identity, total votes *received* on
/// owned graphs (not votes given), and the two graph lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub id:              Uuid,
  pub username:        String,
  pub total_likes:     i64,
  pub total_dislikes:  i64,
  /// Graphs this user created, newest first.
  pub owned_graphs:    Vec<GraphSummary>,
  /// Graphs in which this user has learned at least one node, newest first.
  pub learning_graphs: Vec<GraphSummary>,
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn node(graph_id: Uuid, name: &str, x: f64, y: f64) -> Node {
    Node {
      node_id: Uuid::new_v4(),
      name: name.into(),
      content: String::new(),
      position_x: x,
      position_y: y,
      graph_id,
    }
  }

  #[test]
  fn elements_nodes_then_edges() {
    let graph_id = Uuid::new_v4();
    let a = node(graph_id, "A", 1.0, 2.0);
    let b = node(graph_id, "B", 3.0, 4.0);
    let edge = Edge {
      edge_id:        Uuid::new_v4(),
      graph_id,
      source_node_id: a.node_id,
      target_node_id: b.node_id,
    };

    let elements = assemble_elements(&[a.clone(), b.clone()], &[edge.clone()]);
    assert_eq!(elements.len(), 3);

    match &elements[0] {
      GraphElement::Nodes { data, position } => {
        assert_eq!(data.id, a.node_id.to_string());
        assert_eq!(data.label, "A");
        assert_eq!(position.x, 1.0);
        assert_eq!(position.y, 2.0);
      }
      other => panic!("expected node element, got {other:?}"),
    }

    match &elements[2] {
      GraphElement::Edges { data } => {
        assert_eq!(data.source, a.node_id.to_string());
        assert_eq!(data.target, b.node_id.to_string());
        assert_eq!(data.id, edge.edge_id.to_string());
      }
      other => panic!("expected edge element, got {other:?}"),
    }
  }

  #[test]
  fn element_wire_shape() {
    let graph_id = Uuid::new_v4();
    let n = node(graph_id, "Atoms", 10.0, 20.0);
    let elements = assemble_elements(std::slice::from_ref(&n), &[]);

    let json = serde_json::to_value(&elements[0]).unwrap();
    assert_eq!(json["group"], "nodes");
    assert_eq!(json["data"]["label"], "Atoms");
    assert_eq!(json["position"]["x"], 10.0);
  }

  #[test]
  fn detail_defaults_for_anonymous() {
    let owner_id = Uuid::new_v4();
    let graph = Graph {
      graph_id:    Uuid::new_v4(),
      name:        "Chemistry Basics".into(),
      description: None,
      created_at:  Utc::now(),
      owner_id,
    };
    let owner = UserRef { id: owner_id, username: "ada".into() };

    let detail = GraphDetail::assemble(
      graph,
      owner,
      &[],
      &[],
      RatingCounts::default(),
      Vec::new(),
      None,
    );

    assert_eq!(detail.my_vote, 0);
    assert!(detail.learned_node_ids.is_empty());
    assert_eq!(detail.likes, 0);
    assert_eq!(detail.dislikes, 0);
  }
}
