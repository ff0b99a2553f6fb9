// Copyright @yucwang 2026

use crate::core::error::ConstructionError;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

#[derive(Debug, Clone)]
enum BVHNode {
    /// Primitives `indices[start..end]`.
    Leaf { bound: AABB, start: usize, end: usize },
    Interior { bound: AABB, left: usize, right: usize },
}

impl BVHNode {
    fn bound(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bound, .. } => bound,
            BVHNode::Interior { bound, .. } => bound,
        }
    }
}

/// Bounding volume hierarchy over primitive bounds.
///
/// The tree only knows bounding boxes: primitive tests are delegated to the
/// caller through closures, so the same structure serves any primitive type.
/// Nodes live in a flat vector and reference each other by index.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
}

impl BVH {
    pub fn new(prim_bounds: &[AABB], max_leaf_size: i64) -> Result<Self, ConstructionError> {
        if max_leaf_size < 1 {
            return Err(ConstructionError::InvalidLeafSize(max_leaf_size));
        }

        let mut bvh = Self {
            nodes: Vec::new(),
            indices: (0..prim_bounds.len()).collect(),
        };

        if prim_bounds.is_empty() {
            // Queries on an empty scene still see a well formed root.
            let unit = AABB::new(Vector3f::zeros(), Vector3f::new(1.0, 1.0, 1.0));
            bvh.nodes.push(BVHNode::Leaf { bound: unit, start: 0, end: 0 });
            return Ok(bvh);
        }

        let centroids: Vec<Vector3f> = prim_bounds.iter().map(|b| b.center()).collect();
        bvh.nodes.reserve(2 * prim_bounds.len());
        bvh.build(prim_bounds, &centroids, 0, prim_bounds.len(), max_leaf_size as usize);

        Ok(bvh)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len()
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| *n.bound()).unwrap_or_default()
    }

    fn build(&mut self,
             prim_bounds: &[AABB],
             centroids: &[Vector3f],
             start: usize,
             end: usize,
             max_leaf_size: usize) -> usize {
        let mut bound = AABB::default();
        for &idx in &self.indices[start..end] {
            bound.expand_by_aabb(&prim_bounds[idx]);
        }

        let count = end - start;
        let node_idx = self.nodes.len();
        if count <= max_leaf_size || count < 2 {
            self.nodes.push(BVHNode::Leaf { bound, start, end });
            return node_idx;
        }

        // Median split along the largest extent of the node bound.
        let axis = bound.max_extent() as usize;
        self.indices[start..end].sort_by(|&a, &b| {
            centroids[a][axis].partial_cmp(&centroids[b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mid = start + count / 2;

        // Placeholder until both children exist.
        self.nodes.push(BVHNode::Leaf { bound, start, end });
        let left = self.build(prim_bounds, centroids, start, mid, max_leaf_size);
        let right = self.build(prim_bounds, centroids, mid, end, max_leaf_size);
        self.nodes[node_idx] = BVHNode::Interior { bound, left, right };
        node_idx
    }

    /// Closest hit reported by `hit_fn`. Every accepted hit shrinks
    /// `ray.max_t`, so farther subtrees and primitives are culled.
    pub fn closest_intersection<F, T>(&self, ray: &mut Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        let origin = ray.origin();
        let inv_dir = ray.inv_dir();
        let mut closest: Option<(usize, T)> = None;
        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(node_idx) = stack.pop() {
            match &self.nodes[node_idx] {
                BVHNode::Leaf { bound, start, end } => {
                    if start == end || !bound.intersect_inv(&origin, &inv_dir, ray.min_t, ray.max_t) {
                        continue;
                    }
                    for &prim_idx in &self.indices[*start..*end] {
                        if let Some((hit, t)) = hit_fn(prim_idx, ray) {
                            if ray.update(t) {
                                closest = Some((prim_idx, hit));
                            }
                        }
                    }
                }
                BVHNode::Interior { bound, left, right } => {
                    if bound.intersect_inv(&origin, &inv_dir, ray.min_t, ray.max_t) {
                        stack.push(*right);
                        stack.push(*left);
                    }
                }
            }
        }

        closest
    }

    /// Early-out traversal for shadow rays.
    pub fn has_intersection<F>(&self, ray: &Ray3f, mut hit_fn: F) -> bool
    where
        F: FnMut(usize, &Ray3f) -> bool,
    {
        let origin = ray.origin();
        let inv_dir = ray.inv_dir();
        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(node_idx) = stack.pop() {
            match &self.nodes[node_idx] {
                BVHNode::Leaf { bound, start, end } => {
                    if start == end || !bound.intersect_inv(&origin, &inv_dir, ray.min_t, ray.max_t) {
                        continue;
                    }
                    for &prim_idx in &self.indices[*start..*end] {
                        if hit_fn(prim_idx, ray) {
                            return true;
                        }
                    }
                }
                BVHNode::Interior { bound, left, right } => {
                    if bound.intersect_inv(&origin, &inv_dir, ray.min_t, ray.max_t) {
                        stack.push(*right);
                        stack.push(*left);
                    }
                }
            }
        }

        false
    }
}
