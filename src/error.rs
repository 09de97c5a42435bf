//! Error types for geochain operations.

use thiserror::Error;

/// Errors surfaced by the index facade and the commitment builder.
#[derive(Error, Debug)]
pub enum GeoChainError {
    /// The point falls outside the world boundary the index was built with.
    #[error("point ({x}, {y}) is outside the world boundary")]
    OutOfBounds { x: f64, y: f64 },

    /// Malformed caller input (non-finite coordinates, invalid config, bad hex).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Canonical leaf serialization failed; fatal to the current query only.
    #[error("canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An insertion timestamp predates the unix epoch and cannot be canonicalized.
    #[error("timestamp predates the unix epoch")]
    InvalidTimestamp,

    /// A proof was requested for a leaf position the tree does not have.
    #[error("proof index {index} out of range for {len} leaves")]
    ProofIndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, GeoChainError>;
