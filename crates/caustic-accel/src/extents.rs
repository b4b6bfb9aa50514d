//! Plane-set interval bounds (k-DOP volumes).
//!
//! An [`Extents`] generalizes an axis-aligned box to `N` plane-set normal
//! axes, each tracked as a scalar `[min, max]` interval. With `N = 3` and
//! the Cartesian axes it reduces to an AABB; the default `N = 7` leaves
//! room for the four diagonal plane sets commonly added for tighter ray
//! slab tests. The actual normal directions are a consumer concern — this
//! type only stores and merges the projected intervals.

use caustic_math::Point3;

use crate::pool::Allocator;

/// Number of plane-set normal axes tracked by default.
pub const DEFAULT_PLANE_SETS: usize = 7;

/// Interval bounds over `N` plane-set normal axes.
///
/// Intervals 0–2 align with the Cartesian x, y and z axes by convention;
/// `N` must be at least 3 so a representative point can be derived from
/// them. Merging two extents with different `N` does not type-check, so
/// plane-set agreement between a scene and its objects holds by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents<const N: usize = DEFAULT_PLANE_SETS> {
    d: [[f64; 2]; N],
}

impl<const N: usize> Extents<N> {
    /// Create extents with every interval empty (`+inf, -inf`).
    pub fn new() -> Self {
        debug_assert!(N >= 3, "extents need the three Cartesian axes");
        Self {
            d: [[f64::INFINITY, f64::NEG_INFINITY]; N],
        }
    }

    /// Number of plane-set normal axes tracked.
    pub const fn plane_sets(&self) -> usize {
        N
    }

    /// Lower bound of interval `axis`.
    pub fn min(&self, axis: usize) -> f64 {
        self.d[axis][0]
    }

    /// Upper bound of interval `axis`.
    pub fn max(&self, axis: usize) -> f64 {
        self.d[axis][1]
    }

    /// True until each of the three Cartesian intervals has been extended.
    ///
    /// Empty extents have no centroid and cannot be placed in an octree.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.d[axis][0] > self.d[axis][1])
    }

    /// Fold a scalar projection onto plane-set normal `axis` into its
    /// interval.
    ///
    /// Callers populate an extents by projecting each vertex of their
    /// geometry onto every plane-set normal and feeding the distances
    /// through here.
    pub fn extend_projection(&mut self, axis: usize, value: f64) {
        self.d[axis][0] = self.d[axis][0].min(value);
        self.d[axis][1] = self.d[axis][1].max(value);
    }

    /// Merge another extents into this one.
    ///
    /// Every interval becomes the running minimum/maximum of both inputs.
    pub fn extend_by(&mut self, other: &Extents<N>) {
        for axis in 0..N {
            self.d[axis][0] = self.d[axis][0].min(other.d[axis][0]);
            self.d[axis][1] = self.d[axis][1].max(other.d[axis][1]);
        }
    }

    /// Representative point derived from the three Cartesian intervals.
    ///
    /// Not the interval midpoint: each coordinate is `min + max * 0.5`,
    /// and octant routing in the octree depends on this exact value.
    pub fn centroid(&self) -> Point3 {
        Point3::new(
            self.d[0][0] + self.d[0][1] * 0.5,
            self.d[1][0] + self.d[1][1] * 0.5,
            self.d[2][0] + self.d[2][1] * 0.5,
        )
    }

    /// Like [`centroid`], with the scratch point drawn from `pool`.
    ///
    /// The caller decides when to hand the point back via
    /// [`Allocator::release`].
    ///
    /// [`centroid`]: Extents::centroid
    pub fn centroid_with<A: Allocator<Point3>>(&self, pool: &mut A) -> Point3 {
        let mut p = pool.acquire();
        p.x = self.d[0][0] + self.d[0][1] * 0.5;
        p.y = self.d[1][0] + self.d[1][1] * 0.5;
        p.z = self.d[2][0] + self.d[2][1] * 0.5;
        p
    }
}

impl<const N: usize> Default for Extents<N> {
    fn default() -> Self {
        Self::new()
    }
}
