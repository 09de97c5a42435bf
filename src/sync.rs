//! Thread-safe wrapper around [`DB`] (requires the `sync` feature).
//!
//! Queries take a read lock and may run concurrently; inserts take a write
//! lock so a subdivision in progress is never observed partially.

use crate::config::Config;
use crate::db::DB;
use crate::error::Result;
use crate::quadtree::IndexStats;
use crate::query::{CommittedRadiusResults, CommittedResults};
use crate::types::Point;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable, thread-safe handle to a shared index.
///
/// ```rust
/// use geochain::sync::SyncDB;
/// use std::thread;
///
/// let db = SyncDB::new().unwrap();
/// let writer = db.clone();
///
/// thread::spawn(move || {
///     writer.insert(10.0, 10.0, b"from another thread").unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(db.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SyncDB {
    inner: Arc<RwLock<DB>>,
}

impl SyncDB {
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(DB::with_config(config)?)),
        })
    }

    /// Insert a point (exclusive lock).
    pub fn insert(&self, x: f64, y: f64, payload: &[u8]) -> Result<Point> {
        self.inner.write().insert(x, y, payload)
    }

    /// Rectangular committed query (shared lock).
    pub fn query_range(&self, x: f64, y: f64, width: f64, height: f64) -> Result<CommittedResults> {
        self.inner.read().query_range(x, y, width, height)
    }

    /// Radius committed query (shared lock).
    pub fn query_radius(
        &self,
        center_x: f64,
        center_y: f64,
        radius_meters: f64,
    ) -> Result<CommittedRadiusResults> {
        self.inner.read().query_radius(center_x, center_y, radius_meters)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_inserts_and_queries() {
        let db = SyncDB::with_config(Config::default().with_capacity(2)).unwrap();

        let mut handles = Vec::new();
        for t in 0..4 {
            let db = db.clone();
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    let x = (t as f64) * 10.0 + (i as f64) * 0.1;
                    db.insert(x, 1.0, b"pt").unwrap();
                    let committed = db.query_range(0.0, 0.0, 360.0, 180.0).unwrap();
                    assert!(committed.verify());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(db.len(), 100);
    }

    #[test]
    fn test_clone_shares_state() {
        let db = SyncDB::new().unwrap();
        let other = db.clone();
        db.insert(1.0, 1.0, b"shared").unwrap();
        assert_eq!(other.len(), 1);
    }
}
