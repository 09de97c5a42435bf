//! Index facade owning the quadtree and the insertion sequence counter.
//!
//! `DB` is the construction point for the process-wide index: capacity and
//! world boundary are fixed at creation and the instance lives for the
//! owner's lifetime. It is intentionally **not** thread-safe; subdivision is
//! a structural write that a concurrent query traversal must never observe
//! partially. For multi-threaded use, wrap it yourself (`Arc<RwLock<DB>>`)
//! or enable the `sync` feature and use `SyncDB`, which admits concurrent
//! queries and exclusive inserts.

use crate::commitment::leaf_digest;
use crate::config::Config;
use crate::error::{GeoChainError, Result};
use crate::quadtree::{IndexStats, QuadTree};
use crate::query::{CommittedRadiusResults, CommittedResults};
use crate::types::{Boundary, Point};
use bytes::Bytes;

/// Quadtree point index producing committed query results.
///
/// # Examples
///
/// ```rust
/// use geochain::GeoChain;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut db = GeoChain::new()?;
/// db.insert(-74.0060, 40.7128, b"New York City")?;
///
/// let committed = db.query_radius(-74.0060, 40.7128, 1000.0)?;
/// assert_eq!(committed.committed.results.len(), 1);
/// assert!(committed.verify());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DB {
    tree: QuadTree,
    config: Config,
    next_seq: u64,
}

impl DB {
    /// Create an index with the default configuration (world boundary
    /// centered at the origin, 360x180, capacity 4).
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Create an index from a validated configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(GeoChainError::InvalidInput)?;
        Ok(Self {
            tree: QuadTree::new(config.world, config.capacity),
            config,
            next_seq: 0,
        })
    }

    /// Insert a point with an opaque payload.
    ///
    /// Assigns the insertion timestamp and sequence number, then stores the
    /// point. Returns the stored [`Point`] on success.
    ///
    /// # Errors
    ///
    /// [`GeoChainError::OutOfBounds`] when the point falls outside the world
    /// boundary; [`GeoChainError::InvalidInput`] for non-finite coordinates.
    /// Neither corrupts stored state.
    pub fn insert(&mut self, x: f64, y: f64, payload: &[u8]) -> Result<Point> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoChainError::InvalidInput(format!(
                "coordinates must be finite, got ({x}, {y})"
            )));
        }

        let point = Point::new(x, y, Bytes::copy_from_slice(payload), self.next_seq);
        // Canonicalization must be able to represent the point later; catch
        // a broken clock at insert time rather than at query time.
        leaf_digest(&point)?;

        if !self.tree.insert(point.clone()) {
            log::debug!("rejected out-of-bounds point ({x}, {y})");
            return Err(GeoChainError::OutOfBounds { x, y });
        }

        self.next_seq += 1;
        Ok(point)
    }

    /// Run a rectangular query and commit to its results.
    ///
    /// The rectangle is given in the index's coordinate units as a center
    /// and extent. A degenerate rectangle yields an empty committed result,
    /// never a failure.
    pub fn query_range(&self, x: f64, y: f64, width: f64, height: f64) -> Result<CommittedResults> {
        let range = Boundary::new(x, y, width, height);
        CommittedResults::from_query(self.tree.query_range(&range))
    }

    /// Run a radius query (meters, via the fixed degree conversion) and
    /// commit to its results. The payload echoes the resolved center.
    pub fn query_radius(
        &self,
        center_x: f64,
        center_y: f64,
        radius_meters: f64,
    ) -> Result<CommittedRadiusResults> {
        let points = self.tree.query_radius(center_x, center_y, radius_meters);
        Ok(CommittedRadiusResults {
            center_x,
            center_y,
            radius_meters,
            committed: CommittedResults::from_query(points)?,
        })
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The configuration the index was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Structural statistics for the underlying tree.
    pub fn stats(&self) -> IndexStats {
        self.tree.stats()
    }
}
