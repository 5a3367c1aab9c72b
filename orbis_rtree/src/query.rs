/////////////////////////////////////////////////////////////////////////////////////////////
//
// Orchestrates per-position neighbour lookups across a batch, optionally in parallel.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # query
//!
//! Batch execution over independent query positions. Each position runs the
//! same pipeline (k-NN lookup, optional radius filter, optional `within`
//! containment test) and writes its result into the slot matching its
//! input index, so the output is deterministic regardless of thread count
//! or scheduling. The tree is only read during a batch; construction takes
//! `&mut self` on the index and cannot overlap.

use crate::rtree::RTree;
use orbis_rtree_utils::point_extents;
use rayon::prelude::*;

/// One neighbour of a query position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Neighbour {
    pub id: usize,
    pub distance: f64,
}

/// Runs `op` over every position, preserving input order in the output.
///
/// `num_threads` of 1 runs strictly sequentially on the calling thread
/// (bit-identical to the parallel paths, since positions are independent);
/// 0 uses the shared rayon pool (all hardware threads); any other count
/// runs on a dedicated pool of that size, falling back to the shared pool
/// if the pool cannot be built.
pub(crate) fn run_batch<const N: usize, R, Op>(
    positions: &[[f64; N]],
    num_threads: usize,
    op: Op,
) -> Vec<R>
where
    Op: Fn(&[f64; N]) -> R + Send + Sync,
    R: Send,
{
    match num_threads {
        1 => positions.iter().map(|position| op(position)).collect(),
        0 => positions.par_iter().map(|position| op(position)).collect(),
        n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(|| positions.par_iter().map(|position| op(position)).collect()),
            Err(_) => positions.par_iter().map(|position| op(position)).collect(),
        },
    }
}

/// Collects the neighbour set for one position.
///
/// Runs `knn`, discards neighbours farther than `radius` (keeping a reduced
/// set rather than padding), then applies the `within` constraint: the
/// axis-aligned bounding box of the surviving neighbours must contain the
/// query point (boundary inclusive) or the position reports no result.
pub(crate) fn collect_neighbours<const N: usize>(
    tree: &RTree<N>,
    neighbour_points: impl Fn(usize) -> [f64; N],
    query: &[f64; N],
    k: usize,
    radius: Option<f64>,
    within: bool,
) -> Vec<Neighbour> {
    let mut neighbours: Vec<Neighbour> = tree
        .knn(query, k)
        .into_iter()
        .map(|(id, distance)| Neighbour { id, distance })
        .collect();

    if let Some(radius) = radius {
        neighbours.retain(|neighbour| neighbour.distance <= radius);
    }

    if within && !surrounds(&neighbours, &neighbour_points, query) {
        neighbours.clear();
    }

    neighbours
}

/// The `within` containment test: true when the neighbour set's bounding
/// box contains the query point in every dimension.
fn surrounds<const N: usize>(
    neighbours: &[Neighbour],
    neighbour_points: &impl Fn(usize) -> [f64; N],
    query: &[f64; N],
) -> bool {
    let points: Vec<[f64; N]> = neighbours
        .iter()
        .map(|neighbour| neighbour_points(neighbour.id))
        .collect();

    let Some((mins, maxs)) = point_extents(&points) else {
        return false;
    };

    (0..N).all(|dim| mins[dim] <= query[dim] && query[dim] <= maxs[dim])
}
