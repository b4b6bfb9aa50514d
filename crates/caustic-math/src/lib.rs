#![warn(missing_docs)]

//! Math types for the caustic acceleration kernel.
//!
//! Thin wrappers around nalgebra providing the domain-specific types
//! used by the spatial partitioning crates: points, vectors, and the
//! component-wise point helpers bounding volumes are built from.

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// Component-wise minimum of two points.
#[inline]
pub fn point_min(a: &Point3, b: &Point3) -> Point3 {
    Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

/// Component-wise maximum of two points.
#[inline]
pub fn point_max(a: &Point3, b: &Point3) -> Point3 {
    Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_min_max() {
        let a = Point3::new(1.0, 5.0, -2.0);
        let b = Point3::new(3.0, 4.0, -7.0);
        let lo = point_min(&a, &b);
        let hi = point_max(&a, &b);
        assert_eq!(lo, Point3::new(1.0, 4.0, -7.0));
        assert_eq!(hi, Point3::new(3.0, 5.0, -2.0));
    }

    #[test]
    fn test_point_min_max_with_infinities() {
        // The empty-box sentinel relies on min/max against ±infinity
        // collapsing to the finite operand.
        let empty_min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let empty_max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        let p = Point3::new(0.5, -1.5, 2.0);
        assert_eq!(point_min(&empty_min, &p), p);
        assert_eq!(point_max(&empty_max, &p), p);
    }
}
