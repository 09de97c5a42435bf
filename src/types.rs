//! Core geometric types: indexed points and axis-aligned boundaries.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A stored point with an opaque payload and an assigned insertion timestamp.
///
/// Points are immutable after creation. `x`/`y` are plain coordinates
/// (callers typically interpret them as longitude/latitude, but the index
/// is agnostic to units). `seq` is the process-wide insertion counter used
/// as the deterministic ordering tie-breaker for committed query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Opaque payload; the index never interprets it.
    pub payload: Bytes,
    pub inserted_at: SystemTime,
    pub seq: u64,
}

impl Point {
    /// Create a point stamped with the current time.
    pub fn new(x: f64, y: f64, payload: impl Into<Bytes>, seq: u64) -> Self {
        Self {
            x,
            y,
            payload: payload.into(),
            inserted_at: SystemTime::now(),
            seq,
        }
    }

    /// Create a point with an explicit timestamp.
    pub fn with_timestamp(
        x: f64,
        y: f64,
        payload: impl Into<Bytes>,
        inserted_at: SystemTime,
        seq: u64,
    ) -> Self {
        Self {
            x,
            y,
            payload: payload.into(),
            inserted_at,
            seq,
        }
    }
}

/// Axis-aligned rectangle described by its center and extent.
///
/// Used both as a quadtree node's spatial extent and as a rectangular
/// query range. Containment is inclusive on all four edges: a point lying
/// exactly on an edge satisfies the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Boundary {
    pub const fn new(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Inclusive-edge containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.center_x - self.width / 2.0
            && x <= self.center_x + self.width / 2.0
            && y >= self.center_y - self.height / 2.0
            && y <= self.center_y + self.height / 2.0
    }

    /// Rectangle overlap test: not-disjoint on both axes. Touching edges count.
    pub fn intersects(&self, other: &Self) -> bool {
        (self.center_x - other.center_x).abs() <= (self.width + other.width) / 2.0
            && (self.center_y - other.center_y).abs() <= (self.height + other.height) / 2.0
    }

    /// Distance from `(x, y)` to the nearest point of this rectangle,
    /// zero on any axis where the coordinate already lies inside.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = ((x - self.center_x).abs() - self.width / 2.0).max(0.0);
        let dy = ((y - self.center_y).abs() - self.height / 2.0).max(0.0);
        dx.hypot(dy)
    }

    /// True when the rectangle has no area.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.center_x.is_finite()
            && self.center_y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}
