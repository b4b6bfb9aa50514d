//! Axis-aligned bounding boxes.
//!
//! A `BBox` is the transient computation aid of the octree: one box per
//! node is derived during descent and discarded once its children are
//! visited. Only the octree's root cube is stored long-term.

use caustic_math::{point_max, point_min, Point3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BBox {
    /// Create a box from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) box suitable for expansion.
    ///
    /// The corners start at ±infinity so the first [`extend_by`] collapses
    /// the box to that point.
    ///
    /// [`extend_by`]: BBox::extend_by
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand the box to include a point. Returns `self` for chaining.
    pub fn extend_by(&mut self, p: &Point3) -> &mut Self {
        self.min = point_min(&self.min, p);
        self.max = point_max(&self.max, p);
        self
    }

    /// Midpoint of the box.
    ///
    /// Meaningful only once at least one point has been folded in; the
    /// centroid of an empty box is NaN.
    pub fn centroid(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// The child box of one of the eight octants.
    ///
    /// Bit 4 of `index` selects the x-high half, bit 2 the y-high half and
    /// bit 1 the z-high half, all relative to the box midpoint. For a
    /// cubical box every octant is a congruent cube.
    pub fn octant(&self, index: usize) -> BBox {
        let center = self.centroid();
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            if index & (4 >> axis) != 0 {
                min[axis] = center[axis];
            } else {
                max[axis] = center[axis];
            }
        }
        Self { min, max }
    }

    /// Component-wise membership test (boundary included).
    pub fn contains(&self, p: &Point3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}
