#![warn(missing_docs)]

//! Octree spatial partitioning for accelerated ray-scene intersection.
//!
//! This crate builds a traversable spatial index over per-object bounding
//! extents. It does not trace rays, shade, or touch any rendering API —
//! a consumer computes one [`Extents`] per scene object (plus their union
//! for the whole scene), populates an [`Octree`], and then walks the tree
//! itself, pruning subtrees whose aggregated bounds its rays cannot hit.
//!
//! # Architecture
//!
//! - [`BBox`] - axis-aligned box, the transient cube carried during descent
//! - [`Extents`] - interval bounds over a configurable set of plane-set
//!   normal axes (a k-DOP; an AABB when only the Cartesian axes are used)
//! - [`Octree`] - arena-backed tree with two-phase population: insert
//!   every object, then build once to aggregate per-node bounds
//! - [`Allocator`] / [`FreeListPool`] - injectable allocation strategy for
//!   centroid scratch points
//!
//! # Example
//!
//! ```
//! use caustic_accel::{Extents, Octree};
//!
//! // Two objects, projected onto the three Cartesian axes.
//! let mut a: Extents = Extents::new();
//! let mut b: Extents = Extents::new();
//! for axis in 0..3 {
//!     a.extend_projection(axis, -2.0);
//!     a.extend_projection(axis, -1.0);
//!     b.extend_projection(axis, 1.0);
//!     b.extend_projection(axis, 2.0);
//! }
//!
//! let mut scene: Extents = Extents::new();
//! scene.extend_by(&a);
//! scene.extend_by(&b);
//!
//! let mut octree = Octree::new(&scene)?;
//! octree.insert(a)?;
//! octree.insert(b)?;
//! octree.build()?;
//!
//! // The two objects are far enough apart to split the root.
//! assert!(!octree.node(octree.root()).is_leaf());
//! # Ok::<(), caustic_accel::OctreeError>(())
//! ```

pub mod bbox;
mod error;
pub mod extents;
pub mod octree;
pub mod pool;

pub use bbox::BBox;
pub use error::{OctreeError, Result};
pub use extents::{Extents, DEFAULT_PLANE_SETS};
pub use octree::{NodeKey, Octree, OctreeConfig, OctreeNode, MAX_DEPTH};
pub use pool::{Allocator, FreeListPool};
