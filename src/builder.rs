//! Builder for index construction with explicit configuration.

use crate::config::Config;
use crate::db::DB;
use crate::error::Result;
use crate::types::Boundary;

/// Builder for a [`DB`] with a custom capacity or world boundary.
///
/// ```rust
/// use geochain::{Boundary, DBBuilder};
///
/// let db = DBBuilder::new()
///     .capacity(2)
///     .world(Boundary::new(0.0, 0.0, 360.0, 180.0))
///     .build()
///     .unwrap();
/// assert_eq!(db.config().capacity, 2);
/// ```
#[derive(Debug, Default)]
pub struct DBBuilder {
    config: Config,
}

impl DBBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node capacity (points held before a node subdivides).
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the fixed world boundary.
    pub fn world(mut self, world: Boundary) -> Self {
        self.config.world = world;
        self
    }

    /// Replace the entire configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and construct the index.
    pub fn build(self) -> Result<DB> {
        DB::with_config(self.config)
    }
}
