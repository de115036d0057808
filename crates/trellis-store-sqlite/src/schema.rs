//! SQL schema for the Trellis SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Referential integrity is the schema's job: deleting a graph cascades to
/// its nodes, edges, comments, and ratings; deleting a node cascades to its
/// edges and progress marks. Application code never chases orphans.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL     -- argon2 PHC string
);

CREATE TABLE IF NOT EXISTS graphs (
    graph_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL,      -- ISO 8601 UTC; server-assigned
    owner_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS nodes (
    node_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    content    TEXT NOT NULL DEFAULT '',
    position_x REAL NOT NULL DEFAULT 0,
    position_y REAL NOT NULL DEFAULT 0,
    graph_id   TEXT NOT NULL REFERENCES graphs(graph_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS edges (
    edge_id        TEXT PRIMARY KEY,
    graph_id       TEXT NOT NULL REFERENCES graphs(graph_id) ON DELETE CASCADE,
    source_node_id TEXT NOT NULL REFERENCES nodes(node_id)   ON DELETE CASCADE,
    target_node_id TEXT NOT NULL REFERENCES nodes(node_id)   ON DELETE CASCADE
);

-- Presence of a row = the node is learned. No payload beyond existence.
CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    node_id TEXT NOT NULL REFERENCES nodes(node_id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, node_id)
);

-- At most one vote per (user, graph). Neutral is row absence, never 0.
CREATE TABLE IF NOT EXISTS graph_ratings (
    user_id  TEXT    NOT NULL REFERENCES users(user_id)   ON DELETE CASCADE,
    graph_id TEXT    NOT NULL REFERENCES graphs(graph_id) ON DELETE CASCADE,
    value    INTEGER NOT NULL CHECK (value IN (1, -1)),
    PRIMARY KEY (user_id, graph_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    owner_id   TEXT NOT NULL REFERENCES users(user_id)   ON DELETE CASCADE,
    graph_id   TEXT NOT NULL REFERENCES graphs(graph_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS graphs_owner_idx    ON graphs(owner_id);
CREATE INDEX IF NOT EXISTS graphs_created_idx  ON graphs(created_at);
CREATE INDEX IF NOT EXISTS nodes_graph_idx     ON nodes(graph_id);
CREATE INDEX IF NOT EXISTS edges_graph_idx     ON edges(graph_id);
CREATE INDEX IF NOT EXISTS ratings_graph_idx   ON graph_ratings(graph_id);
CREATE INDEX IF NOT EXISTS comments_graph_idx  ON comments(graph_id);

PRAGMA user_version = 1;
";
