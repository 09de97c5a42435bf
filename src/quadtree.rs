//! Quadtree spatial index over a fixed world boundary.
//!
//! A four-ary recursive partition of the world rectangle. Each node holds
//! points directly until an insertion would exceed its capacity, at which
//! point it subdivides exactly once and irrevocably; later points are routed
//! to whichever child contains them. Supports axis-aligned rectangle queries
//! and approximate radius queries.

use crate::types::{Boundary, Point};
use smallvec::SmallVec;

/// Fixed conversion constant between meters and coordinate degrees.
///
/// Radius queries take meters and divide by this constant uniformly,
/// regardless of latitude. Deliberately not geodesically exact; kept for
/// behavioral compatibility with existing deployments.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

// Child slots in a divided node, in insertion offer order.
const NE: usize = 0;
const NW: usize = 1;
const SE: usize = 2;
const SW: usize = 3;

/// One node of the quadtree: a boundary, its directly held points, and,
/// once divided, exactly four owned children covering the quadrants.
#[derive(Debug, Clone)]
struct QuadNode {
    boundary: Boundary,
    points: SmallVec<[Point; 4]>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            points: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, point: Point, capacity: usize) -> bool {
        if !self.boundary.contains(point.x, point.y) {
            return false;
        }

        // An undivided node under capacity holds the point directly. A
        // divided node never accepts points directly again.
        if self.children.is_none() {
            if self.points.len() < capacity {
                self.points.push(point);
                return true;
            }
            self.subdivide();
        }

        if let Some(children) = self.children.as_mut() {
            // Offer to NE, NW, SE, SW until one accepts. The quadrants tile
            // the parent exactly, so a contained point always finds a home;
            // a point on a shared edge goes to the first quadrant that
            // contains it.
            for child in children.iter_mut() {
                if child.boundary.contains(point.x, point.y) {
                    return child.insert(point, capacity);
                }
            }
        }
        false
    }

    /// One-time quadrant construction: half the parent extent, centered at
    /// the parent center offset by a quarter extent. North is larger y.
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let b = self.boundary;
        let (w, h) = (b.width / 2.0, b.height / 2.0);
        let (dx, dy) = (b.width / 4.0, b.height / 4.0);

        self.children = Some(Box::new([
            QuadNode::new(Boundary::new(b.center_x + dx, b.center_y + dy, w, h)),
            QuadNode::new(Boundary::new(b.center_x - dx, b.center_y + dy, w, h)),
            QuadNode::new(Boundary::new(b.center_x + dx, b.center_y - dy, w, h)),
            QuadNode::new(Boundary::new(b.center_x - dx, b.center_y - dy, w, h)),
        ]));

        log::trace!(
            "subdivided node at ({}, {}) [{}x{}]",
            b.center_x,
            b.center_y,
            b.width,
            b.height
        );
    }

    fn query_range(&self, range: &Boundary, found: &mut Vec<Point>) {
        if !self.boundary.intersects(range) {
            return;
        }

        for p in &self.points {
            if range.contains(p.x, p.y) {
                found.push(p.clone());
            }
        }

        if let Some(children) = &self.children {
            children[NW].query_range(range, found);
            children[NE].query_range(range, found);
            children[SW].query_range(range, found);
            children[SE].query_range(range, found);
        }
    }

    fn query_radius(&self, cx: f64, cy: f64, radius_deg: f64, found: &mut Vec<Point>) {
        // Prune by distance from the center to the nearest point of the
        // node rectangle.
        if self.boundary.distance_to(cx, cy) > radius_deg {
            return;
        }

        for p in &self.points {
            if (p.x - cx).hypot(p.y - cy) <= radius_deg {
                found.push(p.clone());
            }
        }

        if let Some(children) = &self.children {
            children[NW].query_radius(cx, cy, radius_deg, found);
            children[NE].query_radius(cx, cy, radius_deg, found);
            children[SW].query_radius(cx, cy, radius_deg, found);
            children[SE].query_radius(cx, cy, radius_deg, found);
        }
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Self::node_count).sum::<usize>())
    }

    fn depth(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Self::depth).max().unwrap_or(0))
    }
}

/// Point quadtree with a fixed world boundary and node capacity.
///
/// The tree is created once and lives for the owning process's lifetime;
/// nodes are created lazily on subdivision and never destroyed or merged.
/// Not internally synchronized; wrap in a reader/writer lock (or use the
/// `sync` feature's `SyncDB`) for concurrent use.
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadNode,
    capacity: usize,
    len: usize,
}

impl QuadTree {
    /// Create an empty tree over `world` with the given node capacity.
    pub fn new(world: Boundary, capacity: usize) -> Self {
        Self {
            root: QuadNode::new(world),
            capacity,
            len: 0,
        }
    }

    /// Insert a point.
    ///
    /// Returns `false` (a no-op, not an error) when the point lies outside
    /// the world boundary.
    pub fn insert(&mut self, point: Point) -> bool {
        let accepted = self.root.insert(point, self.capacity);
        if accepted {
            self.len += 1;
        }
        accepted
    }

    /// Collect every stored point contained by `range`.
    ///
    /// Traversal is own-node points first, then NW, NE, SW, SE at each
    /// divided node. A degenerate (zero-area) or non-finite range yields an
    /// empty list, never a failure.
    pub fn query_range(&self, range: &Boundary) -> Vec<Point> {
        if !range.is_finite() {
            log::warn!("rejecting range query with non-finite boundary");
            return Vec::new();
        }
        if range.is_degenerate() {
            return Vec::new();
        }

        let mut found = Vec::new();
        self.root.query_range(range, &mut found);
        found
    }

    /// Collect every stored point within `radius_meters` of the center.
    ///
    /// The radius is converted to coordinate degrees via the fixed
    /// [`METERS_PER_DEGREE`] constant, applied uniformly regardless of
    /// latitude. A non-positive or non-finite radius yields an empty list.
    pub fn query_radius(&self, center_x: f64, center_y: f64, radius_meters: f64) -> Vec<Point> {
        if !center_x.is_finite() || !center_y.is_finite() || !radius_meters.is_finite() {
            log::warn!("rejecting radius query with non-finite input");
            return Vec::new();
        }
        if radius_meters <= 0.0 {
            return Vec::new();
        }

        let radius_deg = radius_meters / METERS_PER_DEGREE;
        let mut found = Vec::new();
        self.root.query_radius(center_x, center_y, radius_deg, &mut found);
        found
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The fixed world boundary this tree was created with.
    pub fn world(&self) -> &Boundary {
        &self.root.boundary
    }

    /// The fixed node capacity this tree was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Structural statistics for the tree.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            point_count: self.len,
            node_count: self.root.node_count(),
            depth: self.root.depth(),
        }
    }
}

/// Statistics about the spatial index structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Total number of stored points
    pub point_count: usize,
    /// Total number of tree nodes, including undivided leaves
    pub node_count: usize,
    /// Longest root-to-leaf node chain
    pub depth: usize,
}
