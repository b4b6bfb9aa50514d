//! Octree spatial partitioning over object extents.
//!
//! The octree organizes per-object [`Extents`] into a tree of congruent
//! cubes so a traversal can prune whole subtrees against their aggregated
//! bounds. Population is strictly two-phase: [`Octree::insert`] once per
//! object, then [`Octree::build`] exactly once to aggregate per-node
//! bounds bottom-up. Traversal itself is left to the consumer, which walks
//! the arena through [`Octree::root`], [`OctreeNode::child`] and
//! [`OctreeNode::bounds`].
//!
//! An object is routed to exactly one child by comparing centroids, never
//! duplicated across children. An object straddling an octant boundary
//! therefore lives on one side only, and a traversal must re-check overlap
//! against a node's full bounds rather than trust the partition.

use caustic_math::{Point3, Vec3};
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::bbox::BBox;
use crate::error::{OctreeError, Result};
use crate::extents::Extents;
use crate::pool::{Allocator, FreeListPool};

new_key_type! {
    /// Handle to a node in the octree arena.
    pub struct NodeKey;
}

/// Default ceiling on subdivision depth.
///
/// Guarantees termination under pathological clustering: once a leaf sits
/// at this depth it accumulates items without ever splitting again.
pub const MAX_DEPTH: u32 = 16;

/// Construction parameters for an [`Octree`].
#[derive(Debug, Clone, Copy)]
pub struct OctreeConfig {
    /// Hard ceiling on subdivision depth, [`MAX_DEPTH`] by default.
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A single node of the octree.
///
/// A leaf buffers object extents directly in its item list; an internal
/// node has pushed everything down into up to eight children and, after
/// the build phase, carries the aggregated bounds of its subtree.
#[derive(Debug, Clone)]
pub struct OctreeNode<const N: usize = 7> {
    children: [Option<NodeKey>; 8],
    is_leaf: bool,
    bounds: Extents<N>,
    items: Vec<Extents<N>>,
}

impl<const N: usize> OctreeNode<N> {
    fn new() -> Self {
        Self {
            children: [None; 8],
            is_leaf: true,
            bounds: Extents::new(),
            items: Vec::new(),
        }
    }

    /// Child handle for an octant index.
    ///
    /// Bit 4 of the index selects the x-high half, bit 2 the y-high half,
    /// bit 1 the z-high half of the node's cube.
    pub fn child(&self, octant: usize) -> Option<NodeKey> {
        self.children[octant]
    }

    /// Handles of all existing children, in octant order.
    pub fn children(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Whether this node still buffers items directly.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Aggregated bounds of everything below this node.
    ///
    /// Empty until the build phase has run.
    pub fn bounds(&self) -> &Extents<N> {
        &self.bounds
    }

    /// Object extents buffered at this node.
    ///
    /// Non-empty only for leaves; an internal node has redistributed its
    /// items into children.
    pub fn items(&self) -> &[Extents<N>] {
        &self.items
    }
}

/// Octree over object extents, backed by a node arena.
///
/// Constructed from the scene-wide extents (the union of every object
/// that will be inserted), which it turns into a cubical root bound so
/// all octants are congruent cubes at every level.
#[derive(Debug, Clone)]
pub struct Octree<A: Allocator<Point3> = FreeListPool, const N: usize = 7> {
    nodes: SlotMap<NodeKey, OctreeNode<N>>,
    root: NodeKey,
    bbox: BBox,
    max_depth: u32,
    built: bool,
    pool: A,
}

impl<const N: usize> Octree<FreeListPool, N> {
    /// Create an octree with the default configuration and pool.
    pub fn new(scene: &Extents<N>) -> Result<Self> {
        Self::with_config(scene, OctreeConfig::default(), FreeListPool::new())
    }
}

impl<A: Allocator<Point3>, const N: usize> Octree<A, N> {
    /// Create an octree from the scene-wide extents.
    ///
    /// The root bound is a cube: the largest Cartesian span of `scene`
    /// becomes the side length, centered on the scene's center. A
    /// non-cubic scene therefore gets padded on its short axes instead of
    /// producing thin octant slices.
    pub fn with_config(scene: &Extents<N>, config: OctreeConfig, pool: A) -> Result<Self> {
        if scene.is_empty() {
            return Err(OctreeError::EmptyScene);
        }

        let mut max_diff = f64::NEG_INFINITY;
        for axis in 0..3 {
            max_diff = max_diff.max(scene.max(axis) - scene.min(axis));
        }
        let min_plus_max = Vec3::new(
            scene.min(0) + scene.max(0),
            scene.min(1) + scene.max(1),
            scene.min(2) + scene.max(2),
        );
        let bbox = BBox::new(
            Point3::new(
                (min_plus_max.x - max_diff) * 0.5,
                (min_plus_max.y - max_diff) * 0.5,
                (min_plus_max.z - max_diff) * 0.5,
            ),
            Point3::new(
                (min_plus_max.x + max_diff) * 0.5,
                (min_plus_max.y + max_diff) * 0.5,
                (min_plus_max.z + max_diff) * 0.5,
            ),
        );
        debug!(side = max_diff, "derived cubical root bounds");

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OctreeNode::new());
        Ok(Self {
            nodes,
            root,
            bbox,
            max_depth: config.max_depth,
            built: false,
            pool,
        })
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// The cubical root bound.
    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    /// Look up a node by handle.
    ///
    /// Panics if the key does not belong to this octree.
    pub fn node(&self, key: NodeKey) -> &OctreeNode<N> {
        &self.nodes[key]
    }

    /// Iterate over every node in the arena, in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &OctreeNode<N>)> {
        self.nodes.iter()
    }

    /// Number of nodes currently in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the build phase has run.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The injected allocation pool.
    pub fn pool(&self) -> &A {
        &self.pool
    }

    /// Place one object's extents into the tree.
    ///
    /// Valid only before [`build`]. The extents must have been extended at
    /// least once on each Cartesian axis, otherwise there is no centroid
    /// to route by.
    ///
    /// [`build`]: Octree::build
    pub fn insert(&mut self, extents: Extents<N>) -> Result<()> {
        if self.built {
            return Err(OctreeError::InsertAfterBuild);
        }
        if extents.is_empty() {
            return Err(OctreeError::EmptyExtents);
        }
        let root = self.root;
        let bbox = self.bbox;
        self.insert_at(root, extents, bbox, 0);
        Ok(())
    }

    /// Iterative descent with an explicit work list.
    ///
    /// Splitting a leaf re-queues its buffered items at the same node and
    /// depth, so coincident items burrow one level per pass until they
    /// separate or hit the depth ceiling.
    fn insert_at(&mut self, node: NodeKey, extents: Extents<N>, bbox: BBox, depth: u32) {
        let mut pending = vec![(node, extents, bbox, depth)];
        while let Some((mut key, item, mut bbox, mut depth)) = pending.pop() {
            loop {
                if self.nodes[key].is_leaf {
                    if self.nodes[key].items.is_empty() || depth >= self.max_depth {
                        self.nodes[key].items.push(item);
                        break;
                    }
                    // Second item arriving with headroom left: stop
                    // buffering here and push everything down one level.
                    let node = &mut self.nodes[key];
                    node.is_leaf = false;
                    while let Some(staged) = node.items.pop() {
                        pending.push((key, staged, bbox, depth));
                    }
                    continue;
                }

                // Per-axis centroid comparison builds the 3-bit octant
                // index; ties route high.
                let node_center = bbox.centroid();
                let item_center = item.centroid_with(&mut self.pool);
                let mut octant = 0;
                for axis in 0..3 {
                    if item_center[axis] >= node_center[axis] {
                        octant |= 4 >> axis;
                    }
                }
                self.pool.release(item_center);

                bbox = bbox.octant(octant);
                key = match self.nodes[key].children[octant] {
                    Some(child) => child,
                    None => {
                        let child = self.nodes.insert(OctreeNode::new());
                        self.nodes[key].children[octant] = Some(child);
                        child
                    }
                };
                depth += 1;
            }
        }
    }

    /// Aggregate per-node bounds bottom-up.
    ///
    /// Call exactly once, after all inserts; a second call returns
    /// [`OctreeError::AlreadyBuilt`] and changes nothing. Leaves fold
    /// their buffered items into their bounds, internal nodes fold the
    /// bounds of their children, so after this every node's bounds covers
    /// its whole subtree. Leaf item lists are kept for traversal.
    pub fn build(&mut self) -> Result<()> {
        if self.built {
            return Err(OctreeError::AlreadyBuilt);
        }
        let root = self.root;
        let bbox = self.bbox;
        self.build_node(root, bbox);
        self.built = true;
        debug!(nodes = self.nodes.len(), "octree build complete");
        Ok(())
    }

    // Post-order walk. Recursion depth is capped by `max_depth`.
    fn build_node(&mut self, key: NodeKey, bbox: BBox) {
        if self.nodes[key].is_leaf {
            let OctreeNode { bounds, items, .. } = &mut self.nodes[key];
            for item in items.iter() {
                bounds.extend_by(item);
            }
            return;
        }
        for octant in 0..8 {
            let Some(child) = self.nodes[key].children[octant] else {
                continue;
            };
            self.build_node(child, bbox.octant(octant));
            let child_bounds = self.nodes[child].bounds;
            self.nodes[key].bounds.extend_by(&child_bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Extents spanning `center ± half` on each Cartesian axis.
    fn extents_around(center: [f64; 3], half: f64) -> Extents {
        let mut e = Extents::new();
        for axis in 0..3 {
            e.extend_projection(axis, center[axis] - half);
            e.extend_projection(axis, center[axis] + half);
        }
        e
    }

    /// Scene extents spanning `[-span, span]` on each axis.
    fn scene(span: f64) -> Extents {
        extents_around([0.0, 0.0, 0.0], span)
    }

    fn assert_covers(outer: &Extents, inner: &Extents) {
        for axis in 0..7 {
            assert!(outer.min(axis) <= inner.min(axis));
            assert!(outer.max(axis) >= inner.max(axis));
        }
    }

    fn assert_subtree_contained(octree: &Octree, key: NodeKey) {
        let node = octree.node(key);
        for item in node.items() {
            assert_covers(node.bounds(), item);
        }
        for child in node.children() {
            assert_subtree_contained(octree, child);
            assert_covers(node.bounds(), octree.node(child).bounds());
        }
    }

    #[test]
    fn test_empty_scene_rejected() {
        let empty: Extents = Extents::new();
        assert_eq!(Octree::new(&empty).unwrap_err(), OctreeError::EmptyScene);
    }

    #[test]
    fn test_empty_extents_rejected_on_insert() {
        let mut octree = Octree::new(&scene(10.0)).unwrap();
        assert_eq!(
            octree.insert(Extents::default()).unwrap_err(),
            OctreeError::EmptyExtents
        );
    }

    #[test]
    fn test_single_insert_stays_leaf() {
        let object = extents_around([1.0, 2.0, 3.0], 0.5);
        let mut octree = Octree::new(&scene(10.0)).unwrap();
        octree.insert(object).unwrap();
        octree.build().unwrap();

        let root = octree.node(octree.root());
        assert!(root.is_leaf());
        assert_eq!(root.items().len(), 1);
        assert_eq!(*root.bounds(), object);
        assert_eq!(octree.node_count(), 1);
    }

    #[test]
    fn test_two_separated_objects_split_root() {
        let a = extents_around([-10.0, -10.0, -10.0], 0.5);
        let b = extents_around([10.0, 10.0, 10.0], 0.5);
        let mut octree = Octree::new(&scene(20.0)).unwrap();
        octree.insert(a).unwrap();
        octree.insert(b).unwrap();
        octree.build().unwrap();

        let root = octree.node(octree.root());
        assert!(!root.is_leaf());
        assert_eq!(root.items().len(), 0);

        let children: Vec<_> = root.children().collect();
        assert_eq!(children.len(), 2);
        // One object per child, all-low and all-high octants.
        assert_eq!(root.child(0), Some(children[0]));
        assert_eq!(root.child(7), Some(children[1]));
        for (child, object) in children.iter().zip([a, b]) {
            let node = octree.node(*child);
            assert!(node.is_leaf());
            assert_eq!(node.items(), &[object]);
        }
    }

    #[test]
    fn test_coincident_objects_hit_depth_cap() {
        let mut octree = Octree::new(&scene(20.0)).unwrap();
        for _ in 0..20 {
            octree.insert(extents_around([0.0, 0.0, 0.0], 1.0)).unwrap();
        }
        octree.build().unwrap();

        // Coincident centroids never separate: the tree is a single chain
        // ending in a depth-capped leaf holding everything.
        let mut key = octree.root();
        let mut depth = 0;
        while !octree.node(key).is_leaf() {
            let children: Vec<_> = octree.node(key).children().collect();
            assert_eq!(children.len(), 1);
            key = children[0];
            depth += 1;
        }
        assert_eq!(depth, MAX_DEPTH);
        assert_eq!(octree.node(key).items().len(), 20);
    }

    #[test]
    fn test_no_node_beyond_depth_ceiling() {
        let mut octree = Octree::new(&scene(20.0)).unwrap();
        for i in 0..10 {
            octree.insert(extents_around([0.0, 0.0, 0.0], 1.0)).unwrap();
            let offset = i as f64;
            octree
                .insert(extents_around([offset, -offset, 0.5], 0.25))
                .unwrap();
        }
        octree.build().unwrap();

        fn max_depth_below(octree: &Octree, key: NodeKey) -> u32 {
            octree
                .node(key)
                .children()
                .map(|child| 1 + max_depth_below(octree, child))
                .max()
                .unwrap_or(0)
        }
        assert!(max_depth_below(&octree, octree.root()) <= MAX_DEPTH);
    }

    #[test]
    fn test_cube_root_from_non_cubic_scene() {
        // x spans 100, y and z span 10.
        let mut sc: Extents = Extents::new();
        sc.extend_projection(0, 0.0);
        sc.extend_projection(0, 100.0);
        for axis in 1..3 {
            sc.extend_projection(axis, 0.0);
            sc.extend_projection(axis, 10.0);
        }
        let octree = Octree::new(&sc).unwrap();

        let bbox = octree.bbox();
        assert_relative_eq!(bbox.min.x, 0.0);
        assert_relative_eq!(bbox.max.x, 100.0);
        assert_relative_eq!(bbox.min.y, -45.0);
        assert_relative_eq!(bbox.max.y, 55.0);
        assert_relative_eq!(bbox.min.z, -45.0);
        assert_relative_eq!(bbox.max.z, 55.0);
        assert_eq!(bbox.centroid(), Point3::new(50.0, 5.0, 5.0));
    }

    #[test]
    fn test_bounds_cover_subtrees_after_build() {
        let objects = [
            extents_around([-8.0, 3.0, 1.0], 1.0),
            extents_around([7.0, -2.0, -6.0], 2.0),
            extents_around([0.5, 0.5, 0.5], 0.25),
            extents_around([-4.0, -4.0, 9.0], 0.75),
            extents_around([6.0, 6.0, 6.0], 1.5),
        ];
        let mut sc: Extents = Extents::new();
        for object in &objects {
            sc.extend_by(object);
        }
        let mut octree = Octree::new(&sc).unwrap();
        for object in objects {
            octree.insert(object).unwrap();
        }
        octree.build().unwrap();

        assert_subtree_contained(&octree, octree.root());
        for object in &objects {
            assert_covers(octree.node(octree.root()).bounds(), object);
        }
    }

    #[test]
    fn test_second_build_is_rejected_and_changes_nothing() {
        let mut octree = Octree::new(&scene(10.0)).unwrap();
        octree.insert(extents_around([1.0, 1.0, 1.0], 0.5)).unwrap();
        octree.insert(extents_around([-3.0, 2.0, 0.0], 0.5)).unwrap();
        octree.build().unwrap();
        assert!(octree.is_built());

        let before = *octree.node(octree.root()).bounds();
        assert_eq!(octree.build().unwrap_err(), OctreeError::AlreadyBuilt);
        assert_eq!(*octree.node(octree.root()).bounds(), before);
    }

    #[test]
    fn test_insert_after_build_rejected() {
        let mut octree = Octree::new(&scene(10.0)).unwrap();
        octree.insert(extents_around([1.0, 1.0, 1.0], 0.5)).unwrap();
        octree.build().unwrap();
        assert_eq!(
            octree
                .insert(extents_around([2.0, 2.0, 2.0], 0.5))
                .unwrap_err(),
            OctreeError::InsertAfterBuild
        );
    }

    #[test]
    fn test_straddling_object_lands_in_one_child() {
        // Centered slightly off the origin but overlapping several
        // octants: routed by centroid alone, stored exactly once.
        let straddler = extents_around([0.1, 0.1, 0.1], 5.0);
        let other = extents_around([-9.0, -9.0, -9.0], 0.5);
        let mut octree = Octree::new(&scene(20.0)).unwrap();
        octree.insert(straddler).unwrap();
        octree.insert(other).unwrap();
        octree.build().unwrap();

        let total: usize = octree.nodes().map(|(_, node)| node.items().len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_insert_routes_centroids_through_pool() {
        let mut octree = Octree::new(&scene(10.0)).unwrap();
        octree.insert(extents_around([4.0, 4.0, 4.0], 0.5)).unwrap();
        // First insert lands in the empty root leaf without routing.
        assert_eq!(octree.pool().free_count(), 0);
        octree.insert(extents_around([-4.0, -4.0, 4.0], 0.5)).unwrap();
        assert!(octree.pool().free_count() >= 1);
    }

    #[test]
    fn test_depth_capped_leaf_keeps_accumulating() {
        let config = OctreeConfig { max_depth: 0 };
        let mut octree =
            Octree::with_config(&scene(10.0), config, FreeListPool::new()).unwrap();
        for i in 0..50 {
            let offset = (i % 5) as f64;
            octree
                .insert(extents_around([offset, offset, -offset], 0.5))
                .unwrap();
        }
        octree.build().unwrap();

        // With a zero ceiling the root is the degenerate bucket.
        let root = octree.node(octree.root());
        assert!(root.is_leaf());
        assert_eq!(root.items().len(), 50);
        assert_eq!(octree.node_count(), 1);
    }
}
