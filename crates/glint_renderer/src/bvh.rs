//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to their children by index, either
//! another node or a primitive in the scene's primitive arena. The tree is
//! built once per scene and is read-only afterwards, so any number of
//! threads can traverse it without locking.

use crate::{HitRecord, Hittable, Primitive};
use glint_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use thiserror::Error;

/// Errors from BVH construction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhError {
    #[error("cannot build a BVH over zero primitives")]
    Empty,
}

/// Reference from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhChild {
    /// Index into the primitive arena
    Primitive(usize),
    /// Index into the node arena
    Node(usize),
}

/// Internal node: two children and the union of their boxes.
///
/// A span of one primitive produces a node whose children both point at
/// that primitive, so every node has exactly two children.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhNode {
    pub left: BvhChild,
    pub right: BvhChild,
    pub bbox: Aabb,
}

/// BVH over a primitive arena.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: usize,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// Each split picks a random axis, stably sorts the span by the lower
    /// bound of that axis and cuts it at the midpoint. The primitive arena
    /// itself is left untouched; only an index permutation is sorted.
    pub fn build(primitives: &[Primitive], rng: &mut dyn RngCore) -> Result<Self, BvhError> {
        if primitives.is_empty() {
            return Err(BvhError::Empty);
        }

        let boxes: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
        let mut order: Vec<usize> = (0..primitives.len()).collect();
        let mut nodes = Vec::with_capacity(primitives.len());

        let root = Self::build_span(&boxes, &mut order, &mut nodes, rng);

        Ok(Self { nodes, root })
    }

    /// Recursive construction over one span; returns the new node's index.
    fn build_span(
        boxes: &[Aabb],
        span: &mut [usize],
        nodes: &mut Vec<BvhNode>,
        rng: &mut dyn RngCore,
    ) -> usize {
        let (left, right) = match span.len() {
            1 => (BvhChild::Primitive(span[0]), BvhChild::Primitive(span[0])),
            2 => (BvhChild::Primitive(span[0]), BvhChild::Primitive(span[1])),
            n => {
                let axis = rng.gen_range(0..3);

                // sort_by is stable: equal keys keep their previous order
                span.sort_by(|&a, &b| {
                    let a_min = boxes[a].axis_interval(axis).min;
                    let b_min = boxes[b].axis_interval(axis).min;
                    a_min.total_cmp(&b_min)
                });

                let (lo, hi) = span.split_at_mut(n / 2);
                let left = Self::build_span(boxes, lo, nodes, rng);
                let right = Self::build_span(boxes, hi, nodes, rng);
                (BvhChild::Node(left), BvhChild::Node(right))
            }
        };

        let child_box = |child: BvhChild| match child {
            BvhChild::Primitive(i) => boxes[i],
            BvhChild::Node(i) => nodes[i].bbox,
        };
        let bbox = Aabb::surrounding(&child_box(left), &child_box(right));

        nodes.push(BvhNode { left, right, bbox });
        nodes.len() - 1
    }

    /// Find the closest hit among `primitives` within `ray_t`.
    ///
    /// `primitives` must be the same arena the BVH was built over.
    pub fn hit(&self, primitives: &[Primitive], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.hit_node(self.root, primitives, ray, ray_t)
    }

    fn hit_node(
        &self,
        index: usize,
        primitives: &[Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord> {
        let node = &self.nodes[index];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.hit_child(node.left, primitives, ray, ray_t);

        // Only check right up to closest hit
        let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.hit_child(node.right, primitives, ray, Interval::new(ray_t.min, right_max));

        hit_right.or(hit_left)
    }

    #[inline]
    fn hit_child(
        &self,
        child: BvhChild,
        primitives: &[Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord> {
        match child {
            BvhChild::Primitive(i) => primitives[i].hit(ray, ray_t),
            BvhChild::Node(i) => self.hit_node(i, primitives, ray, ray_t),
        }
    }

    /// Bounding box of everything in the tree.
    pub fn bounding_box(&self) -> Aabb {
        self.nodes[self.root].bbox
    }

    /// The root node.
    pub fn root(&self) -> &BvhNode {
        &self.nodes[self.root]
    }

    /// Node by arena index.
    pub fn node(&self, index: usize) -> &BvhNode {
        &self.nodes[index]
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of node levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        // Children are always pushed before their parent, so one forward
        // pass sees every child depth before it is needed.
        let mut depths = vec![0usize; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            let child_depth = |child: BvhChild| match child {
                BvhChild::Primitive(_) => 0,
                BvhChild::Node(c) => depths[c],
            };
            let depth = 1 + child_depth(node.left).max(child_depth(node.right));
            depths[i] = depth;
        }
        depths[self.root]
    }
}
