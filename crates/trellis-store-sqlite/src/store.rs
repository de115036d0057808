//! [`SqliteStore`] — the SQLite implementation of [`GraphStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use trellis_core::{
  graph::{
    Comment, Edge, Graph, NewEdge, NewGraph, NewNode, Node, NodeUpdate,
  },
  rating::{RatingCounts, RatingValue},
  store::{GraphQuery, GraphStore, SortOrder},
  user::{NewUser, User},
  view::{CommentView, GraphPage, GraphSummary},
};

use crate::{
  Error, Result,
  encode::{
    RawCommentView, RawEdge, RawGraph, RawGraphSummary, RawNode,
    RawUser, decode_rating, decode_uuid, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Shared SQL fragments ────────────────────────────────────────────────────

/// Projection shared by every summary query: graph columns, owner columns,
/// and the per-graph vote aggregates. Callers append WHERE / ORDER BY /
/// LIMIT; `GROUP BY g.graph_id` keeps one row per graph despite the rating
/// join, and the LEFT JOIN keeps zero-rating graphs in the result.
const SUMMARY_SELECT: &str = "
  SELECT
    g.graph_id, g.name, g.description, g.created_at,
    u.user_id, u.username,
    COALESCE(SUM(CASE WHEN r.value = 1  THEN 1 ELSE 0 END), 0) AS likes,
    COALESCE(SUM(CASE WHEN r.value = -1 THEN 1 ELSE 0 END), 0) AS dislikes
  FROM graphs g
  JOIN users u ON u.user_id = g.owner_id
  LEFT JOIN graph_ratings r ON r.graph_id = g.graph_id";

/// Net-rating sort key. Spelled out rather than referencing the aliases so
/// the expression is valid in ORDER BY on every SQLite build.
const NET_RATING_EXPR: &str =
  "COALESCE(SUM(CASE WHEN r.value = 1 THEN 1 WHEN r.value = -1 THEN -1 ELSE 0 END), 0)";

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawGraphSummary> {
  Ok(RawGraphSummary {
    graph_id:    row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    created_at:  row.get(3)?,
    owner_id:    row.get(4)?,
    owner_name:  row.get(5)?,
    likes:       row.get(6)?,
    dislikes:    row.get(7)?,
  })
}

fn node_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawNode> {
  Ok(RawNode {
    node_id:    row.get(0)?,
    name:       row.get(1)?,
    content:    row.get(2)?,
    position_x: row.get(3)?,
    position_y: row.get(4)?,
    graph_id:   row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Trellis store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All reads
/// and writes run on the connection's dedicated thread, so read-then-write
/// sequences inside one `call` closure are serialised with respect to each
/// other.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a summary query (`SUMMARY_SELECT` + the given tail) and decode the
  /// rows. The tail may reference `?1`.
  async fn summaries(
    &self,
    tail: &str,
    param: String,
  ) -> Result<Vec<GraphSummary>> {
    let sql = format!("{SUMMARY_SELECT} {tail}");
    let raws: Vec<RawGraphSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![param], summary_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawGraphSummary::into_summary).collect()
  }
}

// ─── GraphStore impl ─────────────────────────────────────────────────────────

impl GraphStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let hash     = user.password_hash.clone();

    // Existence check and insert run in the same closure, so they are
    // serialised on the connection thread. The UNIQUE constraint backstops
    // them regardless.
    let taken: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          return Ok(true);
        }

        conn.execute(
          "INSERT INTO users (user_id, username, password_hash) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, username, hash],
        )?;
        Ok(false)
      })
      .await?;

    if taken {
      return Err(Error::UsernameTaken(user.username));
    }
    Ok(user)
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password_hash FROM users WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password_hash FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Graphs ────────────────────────────────────────────────────────────────

  async fn add_graph(&self, owner_id: Uuid, input: NewGraph) -> Result<Graph> {
    let graph = Graph {
      graph_id:    Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      created_at:  Utc::now(),
      owner_id,
    };

    let id_str    = encode_uuid(graph.graph_id);
    let name      = graph.name.clone();
    let desc      = graph.description.clone();
    let at_str    = encode_dt(graph.created_at);
    let owner_str = encode_uuid(owner_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO graphs (graph_id, name, description, created_at, owner_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, desc, at_str, owner_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(graph)
  }

  async fn get_graph(&self, id: Uuid) -> Result<Option<Graph>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGraph> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT graph_id, name, description, created_at, owner_id
               FROM graphs WHERE graph_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawGraph {
                  graph_id:    row.get(0)?,
                  name:        row.get(1)?,
                  description: row.get(2)?,
                  created_at:  row.get(3)?,
                  owner_id:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGraph::into_graph).transpose()
  }

  async fn graph_contents(
    &self,
    id: Uuid,
  ) -> Result<Option<(Graph, Vec<Node>, Vec<Edge>)>> {
    let id_str = encode_uuid(id);

    type Contents = Option<(RawGraph, Vec<RawNode>, Vec<RawEdge>)>;
    let raw: Contents = self
      .conn
      .call(move |conn| {
        let graph: Option<RawGraph> = conn
          .query_row(
            "SELECT graph_id, name, description, created_at, owner_id
             FROM graphs WHERE graph_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawGraph {
                graph_id:    row.get(0)?,
                name:        row.get(1)?,
                description: row.get(2)?,
                created_at:  row.get(3)?,
                owner_id:    row.get(4)?,
              })
            },
          )
          .optional()?;

        let Some(graph) = graph else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT node_id, name, content, position_x, position_y, graph_id
           FROM nodes WHERE graph_id = ?1",
        )?;
        let nodes = stmt
          .query_map(rusqlite::params![graph.graph_id], node_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT edge_id, graph_id, source_node_id, target_node_id
           FROM edges WHERE graph_id = ?1",
        )?;
        let edges = stmt
          .query_map(rusqlite::params![graph.graph_id], |row| {
            Ok(RawEdge {
              edge_id:        row.get(0)?,
              graph_id:       row.get(1)?,
              source_node_id: row.get(2)?,
              target_node_id: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((graph, nodes, edges)))
      })
      .await?;

    let Some((graph, nodes, edges)) = raw else {
      return Ok(None);
    };

    Ok(Some((
      graph.into_graph()?,
      nodes
        .into_iter()
        .map(RawNode::into_node)
        .collect::<Result<Vec<_>>>()?,
      edges
        .into_iter()
        .map(RawEdge::into_edge)
        .collect::<Result<Vec<_>>>()?,
    )))
  }

  async fn list_graphs(&self, query: &GraphQuery) -> Result<GraphPage> {
    // Substring filter is case-insensitive; lowercase the pattern here and
    // LOWER() the columns in SQL.
    let pattern = query
      .search
      .as_deref()
      .map(|s| format!("%{}%", s.to_lowercase()));
    let limit  = i64::from(query.limit);
    let offset = i64::from(query.skip);
    let sort   = query.sort;

    let where_clause = if pattern.is_some() {
      "WHERE LOWER(g.name) LIKE ?1 OR LOWER(COALESCE(g.description, '')) LIKE ?1"
    } else {
      ""
    };

    let order_clause = match sort {
      SortOrder::RatingDesc => {
        format!("ORDER BY {NET_RATING_EXPR} DESC, g.created_at DESC")
      }
      SortOrder::DateDesc => "ORDER BY g.created_at DESC".to_string(),
    };

    // Numbered placeholders keep the statement's parameter count at 3 even
    // when the WHERE clause (and its ?1) is absent.
    let sql = format!(
      "{SUMMARY_SELECT}
       {where_clause}
       GROUP BY g.graph_id
       {order_clause}
       LIMIT ?2 OFFSET ?3"
    );

    let count_pattern = pattern.clone();

    let (raws, total): (Vec<RawGraphSummary>, i64) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern.as_deref(), limit, offset],
            summary_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        // The total honours the filter but never the pagination.
        let total: i64 = if let Some(p) = count_pattern {
          conn.query_row(
            "SELECT COUNT(*) FROM graphs g
             WHERE LOWER(g.name) LIKE ?1 OR LOWER(COALESCE(g.description, '')) LIKE ?1",
            rusqlite::params![p],
            |row| row.get(0),
          )?
        } else {
          conn.query_row("SELECT COUNT(*) FROM graphs", [], |row| row.get(0))?
        };

        Ok((rows, total))
      })
      .await?;

    let graphs = raws
      .into_iter()
      .map(RawGraphSummary::into_summary)
      .collect::<Result<Vec<_>>>()?;

    Ok(GraphPage { total, graphs })
  }

  async fn owned_graphs(&self, user_id: Uuid) -> Result<Vec<GraphSummary>> {
    self
      .summaries(
        "WHERE g.owner_id = ?1
         GROUP BY g.graph_id
         ORDER BY g.created_at DESC",
        encode_uuid(user_id),
      )
      .await
  }

  async fn learning_graphs(&self, user_id: Uuid) -> Result<Vec<GraphSummary>> {
    self
      .summaries(
        "WHERE g.graph_id IN (
           SELECT DISTINCT n.graph_id
           FROM nodes n
           JOIN user_progress p ON p.node_id = n.node_id
           WHERE p.user_id = ?1
         )
         GROUP BY g.graph_id
         ORDER BY g.created_at DESC",
        encode_uuid(user_id),
      )
      .await
  }

  // ── Nodes ─────────────────────────────────────────────────────────────────

  async fn add_node(&self, graph_id: Uuid, input: NewNode) -> Result<Node> {
    let node = Node {
      node_id:    Uuid::new_v4(),
      name:       input.name,
      content:    input.content,
      position_x: input.position_x,
      position_y: input.position_y,
      graph_id,
    };

    let id_str    = encode_uuid(node.node_id);
    let name      = node.name.clone();
    let content   = node.content.clone();
    let (x, y)    = (node.position_x, node.position_y);
    let graph_str = encode_uuid(graph_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO nodes (node_id, name, content, position_x, position_y, graph_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, content, x, y, graph_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(node)
  }

  async fn get_node(&self, id: Uuid) -> Result<Option<Node>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNode> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT node_id, name, content, position_x, position_y, graph_id
               FROM nodes WHERE node_id = ?1",
              rusqlite::params![id_str],
              node_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNode::into_node).transpose()
  }

  async fn update_node(
    &self,
    id: Uuid,
    patch: NodeUpdate,
  ) -> Result<Option<Node>> {
    let id_str = encode_uuid(id);

    // Read-modify-write inside one closure so the patch applies to the row
    // as it exists on the connection thread.
    let raw: Option<RawNode> = self
      .conn
      .call(move |conn| {
        let current: Option<RawNode> = conn
          .query_row(
            "SELECT node_id, name, content, position_x, position_y, graph_id
             FROM nodes WHERE node_id = ?1",
            rusqlite::params![id_str],
            node_from_row,
          )
          .optional()?;

        let Some(mut node) = current else {
          return Ok(None);
        };

        if let Some(name) = patch.name {
          node.name = name;
        }
        if let Some(content) = patch.content {
          node.content = content;
        }
        if let Some(x) = patch.position_x {
          node.position_x = x;
        }
        if let Some(y) = patch.position_y {
          node.position_y = y;
        }

        conn.execute(
          "UPDATE nodes SET name = ?2, content = ?3, position_x = ?4, position_y = ?5
           WHERE node_id = ?1",
          rusqlite::params![
            id_str,
            node.name,
            node.content,
            node.position_x,
            node.position_y,
          ],
        )?;

        Ok(Some(node))
      })
      .await?;

    raw.map(RawNode::into_node).transpose()
  }

  async fn delete_node(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM nodes WHERE node_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Edges ─────────────────────────────────────────────────────────────────

  async fn add_edge(&self, graph_id: Uuid, input: NewEdge) -> Result<Edge> {
    let edge = Edge {
      edge_id:        Uuid::new_v4(),
      graph_id,
      source_node_id: input.source_node_id,
      target_node_id: input.target_node_id,
    };

    let id_str     = encode_uuid(edge.edge_id);
    let graph_str  = encode_uuid(graph_id);
    let source_str = encode_uuid(edge.source_node_id);
    let target_str = encode_uuid(edge.target_node_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO edges (edge_id, graph_id, source_node_id, target_node_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, graph_str, source_str, target_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(edge)
  }

  async fn get_edge(&self, id: Uuid) -> Result<Option<Edge>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEdge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT edge_id, graph_id, source_node_id, target_node_id
               FROM edges WHERE edge_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawEdge {
                  edge_id:        row.get(0)?,
                  graph_id:       row.get(1)?,
                  source_node_id: row.get(2)?,
                  target_node_id: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEdge::into_edge).transpose()
  }

  async fn delete_edge(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM edges WHERE edge_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Ratings ───────────────────────────────────────────────────────────────

  async fn rate_graph(
    &self,
    user_id: Uuid,
    graph_id: Uuid,
    value: RatingValue,
  ) -> Result<()> {
    let user_str  = encode_uuid(user_id);
    let graph_str = encode_uuid(graph_id);
    let new_value = value.as_i64();

    // Read-check-then-write runs inside one closure, serialised on the
    // connection thread. No stronger guarantee is claimed.
    self
      .conn
      .call(move |conn| {
        let existing: Option<i64> = conn
          .query_row(
            "SELECT value FROM graph_ratings WHERE user_id = ?1 AND graph_id = ?2",
            rusqlite::params![user_str, graph_str],
            |row| row.get(0),
          )
          .optional()?;

        match existing {
          // Same vote again: retraction.
          Some(v) if v == new_value => {
            conn.execute(
              "DELETE FROM graph_ratings WHERE user_id = ?1 AND graph_id = ?2",
              rusqlite::params![user_str, graph_str],
            )?;
          }
          // Changed their mind: overwrite in place.
          Some(_) => {
            conn.execute(
              "UPDATE graph_ratings SET value = ?3 WHERE user_id = ?1 AND graph_id = ?2",
              rusqlite::params![user_str, graph_str, new_value],
            )?;
          }
          None => {
            conn.execute(
              "INSERT INTO graph_ratings (user_id, graph_id, value) VALUES (?1, ?2, ?3)",
              rusqlite::params![user_str, graph_str, new_value],
            )?;
          }
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn graph_ratings(&self, graph_id: Uuid) -> Result<RatingCounts> {
    let graph_str = encode_uuid(graph_id);

    let (likes, dislikes): (i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COALESCE(SUM(CASE WHEN value = 1  THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(CASE WHEN value = -1 THEN 1 ELSE 0 END), 0)
           FROM graph_ratings WHERE graph_id = ?1",
          rusqlite::params![graph_str],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(RatingCounts { likes, dislikes })
  }

  async fn user_vote(
    &self,
    user_id: Uuid,
    graph_id: Uuid,
  ) -> Result<Option<RatingValue>> {
    let user_str  = encode_uuid(user_id);
    let graph_str = encode_uuid(graph_id);

    let value: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM graph_ratings WHERE user_id = ?1 AND graph_id = ?2",
              rusqlite::params![user_str, graph_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    value.map(decode_rating).transpose()
  }

  async fn received_ratings(&self, user_id: Uuid) -> Result<RatingCounts> {
    let owner_str = encode_uuid(user_id);

    // Votes received on graphs this user owns — not votes the user gave.
    let (likes, dislikes): (i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COALESCE(SUM(CASE WHEN r.value = 1  THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(CASE WHEN r.value = -1 THEN 1 ELSE 0 END), 0)
           FROM graph_ratings r
           WHERE r.graph_id IN (SELECT graph_id FROM graphs WHERE owner_id = ?1)",
          rusqlite::params![owner_str],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(RatingCounts { likes, dislikes })
  }

  // ── Progress ──────────────────────────────────────────────────────────────

  async fn mark_learned(&self, user_id: Uuid, node_id: Uuid) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let node_str = encode_uuid(node_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO user_progress (user_id, node_id) VALUES (?1, ?2)",
          rusqlite::params![user_str, node_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unmark_learned(&self, user_id: Uuid, node_id: Uuid) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let node_str = encode_uuid(node_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM user_progress WHERE user_id = ?1 AND node_id = ?2",
          rusqlite::params![user_str, node_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn learned_in_graph(
    &self,
    user_id: Uuid,
    graph_id: Uuid,
  ) -> Result<Vec<Uuid>> {
    let user_str  = encode_uuid(user_id);
    let graph_str = encode_uuid(graph_id);

    // Single join in place of learned-set ∩ graph-node-set; the observable
    // result is the intersection either way.
    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.node_id
           FROM user_progress p
           JOIN nodes n ON n.node_id = p.node_id
           WHERE p.user_id = ?1 AND n.graph_id = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, graph_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(
    &self,
    graph_id: Uuid,
    owner_id: Uuid,
    content: String,
  ) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      content,
      created_at: Utc::now(),
      owner_id,
      graph_id,
    };

    let id_str    = encode_uuid(comment.comment_id);
    let content   = comment.content.clone();
    let at_str    = encode_dt(comment.created_at);
    let owner_str = encode_uuid(owner_id);
    let graph_str = encode_uuid(graph_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, content, created_at, owner_id, graph_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, content, at_str, owner_str, graph_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn comments_for_graph(
    &self,
    graph_id: Uuid,
    skip: u32,
    limit: u32,
  ) -> Result<Vec<CommentView>> {
    let graph_str = encode_uuid(graph_id);
    let limit     = i64::from(limit);
    let offset    = i64::from(skip);

    let raws: Vec<RawCommentView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.comment_id, c.content, c.created_at, u.user_id, u.username
           FROM comments c
           JOIN users u ON u.user_id = c.owner_id
           WHERE c.graph_id = ?1
           ORDER BY c.created_at DESC
           LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![graph_str, limit, offset], |row| {
            Ok(RawCommentView {
              comment_id: row.get(0)?,
              content:    row.get(1)?,
              created_at: row.get(2)?,
              owner_id:   row.get(3)?,
              owner_name: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommentView::into_view).collect()
  }
}
