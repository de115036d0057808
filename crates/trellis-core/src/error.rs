//! Error types for `trellis-core`.
//!
//! Most failure modes (missing rows, ownership, validation) are surfaced by
//! the storage and HTTP layers; the core keeps only the errors its own
//! types can produce.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid rating value: {0} (expected 1 or -1)")]
  InvalidRatingValue(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
