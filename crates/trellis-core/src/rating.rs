//! Per-user graph votes and their aggregates.
//!
//! A rating is a single +1/-1 vote keyed by (user, graph). Absence of a row
//! means "no opinion" — a neutral value is never persisted. Re-submitting
//! the same value retracts the vote.

use serde::{Deserialize, Serialize};

/// A vote on a graph. Stored as +1 or -1; nothing else is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RatingValue {
  Like,
  Dislike,
}

impl RatingValue {
  /// The integer stored in the `value` column.
  pub fn as_i64(self) -> i64 {
    match self {
      Self::Like => 1,
      Self::Dislike => -1,
    }
  }

  pub fn from_i64(v: i64) -> crate::Result<Self> {
    match v {
      1 => Ok(Self::Like),
      -1 => Ok(Self::Dislike),
      other => Err(crate::Error::InvalidRatingValue(other)),
    }
  }
}

impl From<RatingValue> for i64 {
  fn from(v: RatingValue) -> i64 { v.as_i64() }
}

impl TryFrom<i64> for RatingValue {
  type Error = String;

  fn try_from(v: i64) -> Result<Self, Self::Error> {
    Self::from_i64(v).map_err(|e| e.to_string())
  }
}

/// Like/dislike counts for a graph, or totals received across a user's
/// owned graphs. Zero counts are valid, not an error.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct RatingCounts {
  pub likes:    i64,
  pub dislikes: i64,
}

impl RatingCounts {
  /// Likes minus dislikes — the rating-based sort key for listings.
  pub fn net(self) -> i64 { self.likes - self.dislikes }
}
