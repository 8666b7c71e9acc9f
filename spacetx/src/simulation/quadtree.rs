//! # Spatial index (region quadtree)
//!
//! Hierarchical 2D partition over entity footprints in the x/z plane (the
//! vertical axis is ignored). It accelerates region and visibility queries
//! for the renderer and is rebuilt from scratch every tick.
//!
//! ## Layout
//!
//! - Nodes live in one arena (`Vec<QuadNode>`) and refer to their children by
//!   integer handle. Clearing the tree truncates the arena, with no recursive
//!   drops and no pointer juggling.
//! - A node holds up to `max_objects` footprints. Inserting past that limit
//!   splits it into four quadrants (unless it sits at `max_depth`) and pushes
//!   down every object that fits entirely inside one quadrant.
//! - An object that straddles a quadrant boundary stays at the parent level.
//!   It is never duplicated into several children, so each indexed entity is
//!   reported at most once.
//!
//! ## Quadrant numbering
//!
//! ```text
//!          -x        +x
//!   -z  |  1   |   0   |
//!   +z  |  2   |   3   |
//! ```
//!
//! The same midpoint test classifies both stored footprints and query
//! regions, and it covers the whole plane, so objects that drift outside the
//! root bounds are still stored and found consistently.

use crate::simulation::frustum::Frustum;
use crate::simulation::states::{Entity, EntityId, NVec3};

/// Axis-aligned rectangle in the x/z plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> Self {
        Self { min_x, min_z, max_x, max_z }
    }

    /// Square of half-size `half_extent` centred on `(x, z)`
    pub fn centered(x: f64, z: f64, half_extent: f64) -> Self {
        Self::new(x - half_extent, z - half_extent, x + half_extent, z + half_extent)
    }

    pub fn mid_x(&self) -> f64 {
        0.5 * (self.min_x + self.max_x)
    }

    pub fn mid_z(&self) -> f64 {
        0.5 * (self.min_z + self.max_z)
    }

    pub fn contains_point(&self, x: f64, z: f64) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_z <= other.max_z
            && self.max_z >= other.min_z
    }
}

/// Square footprint of an entity projected onto the x/z plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub x: f64,
    pub z: f64,
    pub half_extent: f64,
}

impl Footprint {
    pub fn of(entity: &Entity) -> Self {
        Self {
            x: entity.position.x,
            z: entity.position.z,
            half_extent: entity.scale,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::centered(self.x, self.z, self.half_extent)
    }
}

/// What the index keeps per entity: the id plus position and footprint cached at insertion
#[derive(Debug, Clone, Copy)]
pub struct IndexedObject {
    pub id: EntityId,
    pub position: NVec3,
    pub footprint: Footprint,
}

struct QuadNode {
    bounds: Bounds,
    level: usize,
    objects: Vec<IndexedObject>,
    children: Option<[usize; 4]>, // indices into SpatialIndex::nodes
}

impl QuadNode {
    fn new(bounds: Bounds, level: usize) -> Self {
        Self {
            bounds,
            level,
            objects: Vec::new(),
            children: None,
        }
    }
}

/// Arena-backed quadtree over entity footprints
pub struct SpatialIndex {
    nodes: Vec<QuadNode>,
    root: usize,
    max_objects: usize,
    max_depth: usize,
    len: usize,
}

impl SpatialIndex {
    /// Empty index whose root covers `bounds`
    pub fn new(bounds: Bounds, max_objects: usize, max_depth: usize) -> Self {
        Self {
            nodes: vec![QuadNode::new(bounds, 0)],
            root: 0,
            max_objects: max_objects.max(1),
            max_depth,
            len: 0,
        }
    }

    /// Drop every node and object, keeping the root bounds
    pub fn clear(&mut self) {
        let bounds = self.nodes[self.root].bounds;
        self.reset(bounds);
    }

    /// Drop everything and re-root the tree on `bounds`
    pub fn reset(&mut self, bounds: Bounds) {
        self.nodes.clear();
        self.nodes.push(QuadNode::new(bounds, 0));
        self.root = 0;
        self.len = 0;
    }

    /// Index the entity's current footprint
    pub fn insert(&mut self, entity: &Entity) {
        let object = IndexedObject {
            id: entity.id,
            position: entity.position,
            footprint: Footprint::of(entity),
        };
        self.insert_at(self.root, object);
        self.len += 1;
    }

    /// Ids stored in every node on the path a region would take through the tree.
    ///
    /// This is a conservative candidate set: it contains every object whose
    /// footprint intersects `region`, plus objects held by ancestor nodes and
    /// by sibling subtrees when the region straddles a split line.
    pub fn query_region(&self, region: &Bounds) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.collect(self.root, region, &mut |object: &IndexedObject| out.push(object.id));
        out
    }

    /// Ids whose footprint contains the point `(x, z)`
    pub fn query_point(&self, x: f64, z: f64) -> Vec<EntityId> {
        let probe = Bounds::new(x, z, x, z);
        let mut out = Vec::new();
        self.collect(self.root, &probe, &mut |object: &IndexedObject| {
            if object.footprint.bounds().contains_point(x, z) {
                out.push(object.id);
            }
        });
        out
    }

    /// Ids of objects inside the view frustum.
    ///
    /// Narrows the search to a `2 * view_distance` square centred on the
    /// viewer's x/z, then keeps objects whose cached position passes the exact
    /// frustum test.
    pub fn query_visible(&self, viewer: &NVec3, frustum: &Frustum, view_distance: f64) -> Vec<EntityId> {
        let region = Bounds::centered(viewer.x, viewer.z, view_distance);
        let mut out = Vec::new();
        self.collect(self.root, &region, &mut |object: &IndexedObject| {
            if frustum.contains_point(&object.position) {
                out.push(object.id);
            }
        });
        out
    }

    /// Every indexed id, one entry per insertion
    pub fn ids(&self) -> Vec<EntityId> {
        self.nodes
            .iter()
            .flat_map(|node| node.objects.iter().map(|o| o.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bounds(&self) -> Bounds {
        self.nodes[self.root].bounds
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest level that currently holds a node
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    // helpers ==============================================================================

    /// Insert `object` starting at `node_idx`.
    ///
    /// - If the node already has children and the footprint fits inside one
    ///   quadrant, forward it there.
    /// - Otherwise store it here. If the node is now over capacity and above
    ///   the depth limit, split it (once) and push down every stored object that
    ///   fits inside a single quadrant. Straddlers stay.
    fn insert_at(&mut self, node_idx: usize, object: IndexedObject) {
        let bounds = self.nodes[node_idx].bounds;

        if let Some(children) = self.nodes[node_idx].children {
            if let Some(q) = quadrant_for(&bounds, &object.footprint.bounds()) {
                self.insert_at(children[q], object);
                return;
            }
        }

        self.nodes[node_idx].objects.push(object);

        let over_capacity = self.nodes[node_idx].objects.len() > self.max_objects;
        if !over_capacity || self.nodes[node_idx].level >= self.max_depth {
            return;
        }

        let children = match self.nodes[node_idx].children {
            Some(children) => children,
            None => self.subdivide(node_idx),
        };

        // Take the objects out so we don't hold &mut while recursing
        let pending = std::mem::take(&mut self.nodes[node_idx].objects);
        let mut kept = Vec::with_capacity(pending.len());
        for object in pending {
            match quadrant_for(&bounds, &object.footprint.bounds()) {
                Some(q) => self.insert_at(children[q], object),
                None => kept.push(object),
            }
        }
        self.nodes[node_idx].objects = kept;
    }

    /// Create the four quadrant children of `node_idx` and return their handles
    fn subdivide(&mut self, node_idx: usize) -> [usize; 4] {
        let bounds = self.nodes[node_idx].bounds;
        let level = self.nodes[node_idx].level + 1;

        let mut children = [0usize; 4];
        for (q, slot) in children.iter_mut().enumerate() {
            *slot = self.nodes.len();
            self.nodes.push(QuadNode::new(quadrant_bounds(&bounds, q), level));
        }
        self.nodes[node_idx].children = Some(children);
        children
    }

    /// Visit the objects of every node a query for `region` reaches.
    ///
    /// At an internal node the region descends into its single quadrant when
    /// it fits in one, or into all four when it straddles a split line.
    /// The node's own (straddling) objects are always visited.
    fn collect<F>(&self, node_idx: usize, region: &Bounds, visit: &mut F)
    where
        F: FnMut(&IndexedObject),
    {
        let node = &self.nodes[node_idx];

        if let Some(children) = node.children {
            match quadrant_for(&node.bounds, region) {
                Some(q) => self.collect(children[q], region, visit),
                None => {
                    for child in children {
                        self.collect(child, region, visit);
                    }
                }
            }
        }

        for object in &node.objects {
            visit(object);
        }
    }
}

// helpers ===========================================================================

/// Quadrant of `parent` that fully contains `rect`, or `None` if `rect`
/// touches or crosses either midpoint line.
///
/// Boundaries are strict: a rectangle whose edge lies exactly on a midpoint
/// stays with the parent.
fn quadrant_for(parent: &Bounds, rect: &Bounds) -> Option<usize> {
    let mid_x = parent.mid_x();
    let mid_z = parent.mid_z();

    let low_z = rect.max_z < mid_z;
    let high_z = rect.min_z > mid_z;

    if rect.max_x < mid_x {
        if low_z {
            Some(1)
        } else if high_z {
            Some(2)
        } else {
            None
        }
    } else if rect.min_x > mid_x {
        if low_z {
            Some(0)
        } else if high_z {
            Some(3)
        } else {
            None
        }
    } else {
        None
    }
}

/// Bounds of quadrant `q` of `parent` (see the numbering in the module docs)
fn quadrant_bounds(parent: &Bounds, q: usize) -> Bounds {
    let mid_x = parent.mid_x();
    let mid_z = parent.mid_z();

    let (min_x, max_x) = if q == 0 || q == 3 {
        (mid_x, parent.max_x)
    } else {
        (parent.min_x, mid_x)
    };
    let (min_z, max_z) = if q == 0 || q == 1 {
        (parent.min_z, mid_z)
    } else {
        (mid_z, parent.max_z)
    };

    Bounds::new(min_x, min_z, max_x, max_z)
}
