//! Error types for the accelerator.

use thiserror::Error;

/// Errors from octree construction and population.
///
/// Every variant is a caller contract violation; the tree algorithms
/// themselves have no internal failure paths.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OctreeError {
    /// The scene extents were never extended, so no root cube can be
    /// derived from them.
    #[error("scene extents are empty")]
    EmptyScene,

    /// The inserted extents were never extended; they have no centroid to
    /// route by.
    #[error("inserted extents are empty")]
    EmptyExtents,

    /// `insert` was called after `build`; the tree is strictly
    /// populate-then-build.
    #[error("octree is already built, inserts must happen before build")]
    InsertAfterBuild,

    /// `build` was called more than once.
    #[error("octree is already built")]
    AlreadyBuilt,
}

/// Result type for octree operations.
pub type Result<T> = std::result::Result<T, OctreeError>;
