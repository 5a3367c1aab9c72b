/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the balanced R-tree: packed bulk loading, incremental insertion, and k-NN search.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # rtree
//!
//! The spatial index at the heart of the crate: a height-balanced tree of
//! nested axis-aligned bounding boxes over `N`-dimensional points.
//!
//! Construction is either bulk ("packing", a sort-tile-recursive load that
//! fills leaves close to capacity and yields tight boxes) or incremental
//! (Guttman insertion with least-enlargement descent and quadratic node
//! splits). Nearest-neighbour queries run a best-first traversal over a
//! priority queue keyed by the minimum distance from the query point to each
//! pending box, which makes the search exact: no entry nearer than the k-th
//! result can be missed.
//!
//! All geometry is computed in `f64`; callers convert storage-precision
//! coordinates at the boundary.
//!
//! # References
//! 1. A. Guttman. R-trees: a dynamic index structure for spatial searching.
//!    SIGMOD 1984.
//! 2. S. T. Leutenegger, M. A. Lopez, J. Edgington. STR: a simple and
//!    efficient algorithm for R-tree packing. ICDE 1997.
//! 3. G. R. Hjaltason, H. Samet. Distance browsing in spatial databases.
//!    ACM TODS 24(2), 1999.

use orbis_rtree_utils::get_distance_sq;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Maximum number of entries (or children) per node.
const MAX_ENTRIES: usize = 16;

/// Minimum fill of a node produced by a split.
const MIN_ENTRIES: usize = 6;

/// A point plus the dense id that resolves it in the point store.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeEntry<const N: usize> {
    pub point: [f64; N],
    pub id: usize,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
struct Aabb<const N: usize> {
    min: [f64; N],
    max: [f64; N],
}

impl<const N: usize> Aabb<N> {
    #[inline(always)]
    fn from_point(point: &[f64; N]) -> Self {
        Self {
            min: *point,
            max: *point,
        }
    }

    fn from_points<'a, I: IntoIterator<Item = &'a [f64; N]>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let mut bbox = Self::from_point(iter.next().expect("box of an empty point set"));
        for point in iter {
            bbox.expand_point(point);
        }
        bbox
    }

    #[inline(always)]
    fn expand(&mut self, other: &Self) {
        for dim in 0..N {
            self.min[dim] = self.min[dim].min(other.min[dim]);
            self.max[dim] = self.max[dim].max(other.max[dim]);
        }
    }

    #[inline(always)]
    fn expand_point(&mut self, point: &[f64; N]) {
        for dim in 0..N {
            self.min[dim] = self.min[dim].min(point[dim]);
            self.max[dim] = self.max[dim].max(point[dim]);
        }
    }

    fn union(a: &Self, b: &Self) -> Self {
        let mut out = *a;
        out.expand(b);
        out
    }

    /// Volume of the box (product of side lengths).
    #[inline(always)]
    fn area(&self) -> f64 {
        let mut area = 1.0;
        for dim in 0..N {
            area *= self.max[dim] - self.min[dim];
        }
        area
    }

    #[inline(always)]
    fn union_area(&self, other: &Self) -> f64 {
        Self::union(self, other).area()
    }

    /// Volume the box would have after absorbing `point`.
    #[inline(always)]
    fn enlarged_area(&self, point: &[f64; N]) -> f64 {
        let mut area = 1.0;
        for dim in 0..N {
            let min = self.min[dim].min(point[dim]);
            let max = self.max[dim].max(point[dim]);
            area *= max - min;
        }
        area
    }

    /// Squared distance from `point` to the nearest face of the box; zero
    /// when the point lies inside.
    #[inline(always)]
    fn min_dist_sq(&self, point: &[f64; N]) -> f64 {
        let mut dist = 0.0;
        for dim in 0..N {
            let coord = point[dim];
            let gap = if coord < self.min[dim] {
                self.min[dim] - coord
            } else if coord > self.max[dim] {
                coord - self.max[dim]
            } else {
                0.0
            };
            dist += gap * gap;
        }
        dist
    }
}

#[derive(Debug, Clone)]
enum NodeKind<const N: usize> {
    Internal(Vec<usize>),
    Leaf(Vec<TreeEntry<N>>),
}

#[derive(Debug, Clone)]
struct Node<const N: usize> {
    bbox: Aabb<N>,
    kind: NodeKind<N>,
}

/// Best-first queue item: either a pending node (keyed by the minimum
/// distance to its box) or a concrete entry (keyed by its true distance).
///
/// The ordering is reversed so `BinaryHeap` pops the smallest key first;
/// at equal distance entries pop before nodes, and lower ids pop first,
/// which fixes the tie-break order of the results.
#[derive(Debug, PartialEq)]
struct QueueItem {
    dist_sq: f64,
    is_node: bool,
    idx: usize,
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Reverse order for max-heap.
        let a = (other.dist_sq, other.is_node, other.idx);
        let b = (self.dist_sq, self.is_node, self.idx);
        a.partial_cmp(&b)
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Height-balanced R-tree over `N`-dimensional points.
#[derive(Debug, Clone)]
pub(crate) struct RTree<const N: usize> {
    nodes: Vec<Node<N>>,
    root: Option<usize>,
    num_entries: usize,
}

impl<const N: usize> RTree<N> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            num_entries: 0,
        }
    }

    /// Number of entries held by the tree.
    pub fn len(&self) -> usize {
        self.num_entries
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    /// Discards every node and entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.num_entries = 0;
    }

    /// The minimum and maximum corners of the root box, or `None` when the
    /// tree is empty.
    pub fn bounds(&self) -> Option<([f64; N], [f64; N])> {
        self.root.map(|root| {
            let bbox = &self.nodes[root].bbox;
            (bbox.min, bbox.max)
        })
    }

    fn push_node(&mut self, node: Node<N>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Rebuilds the tree from scratch with a sort-tile-recursive bulk load.
    ///
    /// Entries are recursively sliced into slabs along successive axes
    /// (ties broken by id, so the build is deterministic for a given entry
    /// sequence), producing leaves filled close to capacity; upper levels
    /// group consecutive nodes until a single root remains.
    pub fn bulk_load(&mut self, mut entries: Vec<TreeEntry<N>>) {
        self.clear();
        self.num_entries = entries.len();
        if entries.is_empty() {
            return;
        }

        let mut level = Vec::new();
        self.pack_slab(&mut entries, 0, &mut level);

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(MAX_ENTRIES));
            for chunk in level.chunks(MAX_ENTRIES) {
                let mut bbox = self.nodes[chunk[0]].bbox;
                for &child in &chunk[1..] {
                    let child_bbox = self.nodes[child].bbox;
                    bbox.expand(&child_bbox);
                }
                next.push(self.push_node(Node {
                    bbox,
                    kind: NodeKind::Internal(chunk.to_vec()),
                }));
            }
            level = next;
        }

        self.root = Some(level[0]);
    }

    fn pack_slab(&mut self, entries: &mut [TreeEntry<N>], axis: usize, leaves: &mut Vec<usize>) {
        if entries.len() <= MAX_ENTRIES {
            let bbox = Aabb::from_points(entries.iter().map(|entry| &entry.point));
            let leaf = self.push_node(Node {
                bbox,
                kind: NodeKind::Leaf(entries.to_vec()),
            });
            leaves.push(leaf);
            return;
        }

        entries.sort_by(|a, b| {
            a.point[axis]
                .partial_cmp(&b.point[axis])
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let num_leaves = entries.len().div_ceil(MAX_ENTRIES);
        let num_slabs = if axis + 1 < N {
            let dims_remaining = (N - axis) as f64;
            ((num_leaves as f64).powf(1.0 / dims_remaining).ceil() as usize).max(1)
        } else {
            num_leaves
        };

        let slab_len = entries.len().div_ceil(num_slabs);
        let next_axis = (axis + 1).min(N - 1);
        for slab in entries.chunks_mut(slab_len) {
            self.pack_slab(slab, next_axis, leaves);
        }
    }

    /// Inserts a single entry, splitting overflowing nodes on the way back
    /// up and growing a new root when the old one splits.
    pub fn insert(&mut self, entry: TreeEntry<N>) {
        self.num_entries += 1;

        let Some(root) = self.root else {
            let leaf = self.push_node(Node {
                bbox: Aabb::from_point(&entry.point),
                kind: NodeKind::Leaf(vec![entry]),
            });
            self.root = Some(leaf);
            return;
        };

        if let Some(sibling) = self.insert_rec(root, entry) {
            let bbox = Aabb::union(&self.nodes[root].bbox, &self.nodes[sibling].bbox);
            let new_root = self.push_node(Node {
                bbox,
                kind: NodeKind::Internal(vec![root, sibling]),
            });
            self.root = Some(new_root);
        }
    }

    /// Recursive insertion step; returns the id of a split-off sibling when
    /// the visited node overflowed.
    fn insert_rec(&mut self, node_id: usize, entry: TreeEntry<N>) -> Option<usize> {
        self.nodes[node_id].bbox.expand_point(&entry.point);

        let overflow = if matches!(self.nodes[node_id].kind, NodeKind::Leaf(_)) {
            let NodeKind::Leaf(entries) = &mut self.nodes[node_id].kind else {
                unreachable!()
            };
            entries.push(entry);
            entries.len() > MAX_ENTRIES
        } else {
            let child = self.choose_subtree(node_id, &entry.point);
            match self.insert_rec(child, entry) {
                None => false,
                Some(sibling) => {
                    let NodeKind::Internal(children) = &mut self.nodes[node_id].kind else {
                        unreachable!()
                    };
                    children.push(sibling);
                    children.len() > MAX_ENTRIES
                }
            }
        };

        overflow.then(|| self.split_node(node_id))
    }

    /// Chooses the child whose box needs the least enlargement to absorb
    /// `point`; ties fall to the smaller box, then to the earlier child.
    fn choose_subtree(&self, node_id: usize, point: &[f64; N]) -> usize {
        let NodeKind::Internal(children) = &self.nodes[node_id].kind else {
            unreachable!()
        };

        let mut best = children[0];
        let mut best_enlargement = f64::INFINITY;
        let mut best_area = f64::INFINITY;

        for &child in children {
            let bbox = &self.nodes[child].bbox;
            let area = bbox.area();
            let enlargement = bbox.enlarged_area(point) - area;

            if enlargement < best_enlargement
                || (enlargement == best_enlargement && area < best_area)
            {
                best = child;
                best_enlargement = enlargement;
                best_area = area;
            }
        }

        best
    }

    /// Splits an overflowing node in place; the second group moves into a
    /// freshly allocated sibling whose id is returned.
    fn split_node(&mut self, node_id: usize) -> usize {
        let kind = std::mem::replace(&mut self.nodes[node_id].kind, NodeKind::Internal(Vec::new()));

        match kind {
            NodeKind::Leaf(entries) => {
                let items = entries
                    .into_iter()
                    .map(|entry| (Aabb::from_point(&entry.point), entry))
                    .collect();
                let (first, second) = quadratic_partition(items);

                let (first_bbox, first_entries) = regroup(first);
                let (second_bbox, second_entries) = regroup(second);

                self.nodes[node_id].bbox = first_bbox;
                self.nodes[node_id].kind = NodeKind::Leaf(first_entries);
                self.push_node(Node {
                    bbox: second_bbox,
                    kind: NodeKind::Leaf(second_entries),
                })
            }
            NodeKind::Internal(children) => {
                let items = children
                    .into_iter()
                    .map(|child| (self.nodes[child].bbox, child))
                    .collect();
                let (first, second) = quadratic_partition(items);

                let (first_bbox, first_children) = regroup(first);
                let (second_bbox, second_children) = regroup(second);

                self.nodes[node_id].bbox = first_bbox;
                self.nodes[node_id].kind = NodeKind::Internal(first_children);
                self.push_node(Node {
                    bbox: second_bbox,
                    kind: NodeKind::Internal(second_children),
                })
            }
        }
    }

    /// Returns the `k` entries nearest to `query` as `(id, distance)`,
    /// ascending by distance with ties broken by ascending id.
    ///
    /// `k == 0` and the empty tree both yield an empty result; fewer than
    /// `k` results are returned only when the tree holds fewer entries.
    pub fn knn(&self, query: &[f64; N], k: usize) -> Vec<(usize, f64)> {
        let mut results = Vec::new();
        if k == 0 {
            return results;
        }
        let Some(root) = self.root else {
            return results;
        };

        let mut queue = BinaryHeap::new();
        queue.push(QueueItem {
            dist_sq: self.nodes[root].bbox.min_dist_sq(query),
            is_node: true,
            idx: root,
        });

        while let Some(item) = queue.pop() {
            if !item.is_node {
                results.push((item.idx, item.dist_sq.sqrt()));
                if results.len() == k {
                    break;
                }
                continue;
            }

            match &self.nodes[item.idx].kind {
                NodeKind::Internal(children) => {
                    for &child in children {
                        queue.push(QueueItem {
                            dist_sq: self.nodes[child].bbox.min_dist_sq(query),
                            is_node: true,
                            idx: child,
                        });
                    }
                }
                NodeKind::Leaf(entries) => {
                    for entry in entries {
                        queue.push(QueueItem {
                            dist_sq: get_distance_sq(&entry.point, query),
                            is_node: false,
                            idx: entry.id,
                        });
                    }
                }
            }
        }

        results
    }
}

/// Recomputes the bounding box of a split group and strips the box tags.
fn regroup<T, const N: usize>(items: Vec<(Aabb<N>, T)>) -> (Aabb<N>, Vec<T>) {
    let mut iter = items.into_iter();
    let (mut bbox, first) = iter.next().expect("split produced an empty group");
    let mut payload = vec![first];
    for (item_bbox, item) in iter {
        bbox.expand(&item_bbox);
        payload.push(item);
    }
    (bbox, payload)
}

/// Guttman's quadratic split over a set of boxed items.
///
/// Seeds are the pair wasting the most dead space when joined; remaining
/// items go, one at a time, to the group whose box grows the least, with
/// the remainder dumped wholesale once a group must take everything left to
/// reach the minimum fill.
fn quadratic_partition<T, const N: usize>(
    mut items: Vec<(Aabb<N>, T)>,
) -> (Vec<(Aabb<N>, T)>, Vec<(Aabb<N>, T)>) {
    debug_assert!(items.len() >= 2);

    // Seed selection.
    let (mut seed_a, mut seed_b) = (0, 1);
    let mut worst_waste = f64::NEG_INFINITY;
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            let waste = items[i].0.union_area(&items[j].0) - items[i].0.area() - items[j].0.area();
            if waste > worst_waste {
                worst_waste = waste;
                seed_a = i;
                seed_b = j;
            }
        }
    }

    // Remove the later index first so the earlier one stays valid.
    let item_b = items.swap_remove(seed_b);
    let item_a = items.swap_remove(seed_a);

    let mut bbox_a = item_a.0;
    let mut bbox_b = item_b.0;
    let mut group_a = vec![item_a];
    let mut group_b = vec![item_b];

    while let Some(next) = pick_next(&items, &bbox_a, &bbox_b) {
        let remaining = items.len();

        // Honour the minimum fill: once a group can only reach it by taking
        // every remaining item, stop choosing.
        if group_a.len() + remaining <= MIN_ENTRIES {
            for item in items.drain(..) {
                bbox_a.expand(&item.0);
                group_a.push(item);
            }
            break;
        }
        if group_b.len() + remaining <= MIN_ENTRIES {
            for item in items.drain(..) {
                bbox_b.expand(&item.0);
                group_b.push(item);
            }
            break;
        }

        let item = items.swap_remove(next);
        let growth_a = bbox_a.union_area(&item.0) - bbox_a.area();
        let growth_b = bbox_b.union_area(&item.0) - bbox_b.area();

        let to_a = match growth_a.partial_cmp(&growth_b) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            _ => match bbox_a.area().partial_cmp(&bbox_b.area()) {
                Some(Ordering::Less) => true,
                Some(Ordering::Greater) => false,
                _ => group_a.len() <= group_b.len(),
            },
        };

        if to_a {
            bbox_a.expand(&item.0);
            group_a.push(item);
        } else {
            bbox_b.expand(&item.0);
            group_b.push(item);
        }
    }

    (group_a, group_b)
}

/// Index of the unassigned item with the strongest preference between the
/// two groups, or `None` when no items remain.
fn pick_next<T, const N: usize>(
    items: &[(Aabb<N>, T)],
    bbox_a: &Aabb<N>,
    bbox_b: &Aabb<N>,
) -> Option<usize> {
    let mut best = None;
    let mut best_preference = f64::NEG_INFINITY;
    for (idx, (bbox, _)) in items.iter().enumerate() {
        let growth_a = bbox_a.union_area(bbox) - bbox_a.area();
        let growth_b = bbox_b.union_area(bbox) - bbox_b.area();
        let preference = (growth_a - growth_b).abs();
        if preference > best_preference {
            best_preference = preference;
            best = Some(idx);
        }
    }
    best
}
