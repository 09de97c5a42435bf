//! Embedded quadtree point index with verifiable query commitments.
//!
//! Points are indexed in a four-ary recursive partition of a fixed world
//! boundary. Every query (axis-aligned rectangle or circular radius)
//! returns its results together with a SHA-256 commitment root and one
//! inclusion proof per result, so a remote verifier can confirm a claimed
//! result belongs to the committed set without re-running the query.
//!
//! ```rust
//! use geochain::GeoChain;
//!
//! let mut db = GeoChain::new()?;
//! db.insert(-74.0060, 40.7128, b"NYC")?;
//!
//! let committed = db.query_radius(-74.0060, 40.7128, 1000.0)?;
//! assert!(committed.verify());
//! # Ok::<(), geochain::GeoChainError>(())
//! ```

pub mod builder;
pub mod commitment;
pub mod config;
pub mod db;
pub mod error;
pub mod quadtree;
pub mod query;
pub mod types;

#[cfg(feature = "sync")]
pub mod sync;

pub use builder::DBBuilder;
pub use commitment::{CommitmentTree, Digest, InclusionProof, leaf_digest};
pub use config::Config;
pub use db::DB;
pub use error::{GeoChainError, Result};
pub use quadtree::{IndexStats, METERS_PER_DEGREE, QuadTree};
pub use query::{CommittedRadiusResults, CommittedResults, order_results};
pub use types::{Boundary, Point};

#[cfg(feature = "sync")]
pub use sync::SyncDB;

pub type GeoChain = DB;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DBBuilder, GeoChain, GeoChainError, Result};

    pub use crate::{Boundary, Config, Point};

    pub use crate::{CommittedRadiusResults, CommittedResults, Digest, InclusionProof};

    #[cfg(feature = "sync")]
    pub use crate::SyncDB;
}
