/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the flat point and value storage backing the spatial index.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # point_store
//!
//! Contiguous storage for the indexed observations: an `N`-dimensional
//! coordinate array and a parallel scalar value array, addressed by a dense
//! id assigned in insertion order. The store owns all point/value memory;
//! the tree only ever holds ids into it.

use orbis_rtree_utils::SpatialScalar;

/// Flat, id-addressed storage of Cartesian points and their scalar values.
///
/// Mutation is not internally synchronized; the owning index serializes
/// writes against reads.
#[derive(Debug, Clone)]
pub(crate) struct PointStore<F: SpatialScalar, const N: usize> {
    points: Vec<[F; N]>,
    values: Vec<F>,
}

impl<F: SpatialScalar, const N: usize> PointStore<F, N> {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends an observation and returns its dense id.
    #[inline(always)]
    pub fn append(&mut self, point: [F; N], value: F) -> usize {
        let id = self.points.len();
        self.points.push(point);
        self.values.push(value);
        id
    }

    /// Returns the coordinates stored under `id`.
    #[inline(always)]
    pub fn point(&self, id: usize) -> &[F; N] {
        &self.points[id]
    }

    /// Returns the scalar value stored under `id`.
    #[inline(always)]
    pub fn value(&self, id: usize) -> F {
        self.values[id]
    }

    /// Number of stored observations.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Discards every observation; ids restart at zero afterwards.
    pub fn clear(&mut self) {
        self.points.clear();
        self.values.clear();
    }

    /// Iterates `(id, point, value)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[F; N], F)> + '_ {
        self.points
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .map(|(id, (point, value))| (id, point, *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_dense_ids() {
        let mut store = PointStore::<f64, 3>::new();
        assert!(store.is_empty());

        let a = store.append([1.0, 0.0, 0.0], 10.0);
        let b = store.append([0.0, 1.0, 0.0], 20.0);
        assert_eq!((a, b), (0, 1));
        assert_eq!(store.len(), 2);

        assert_eq!(store.point(1), &[0.0, 1.0, 0.0]);
        assert_eq!(store.value(0), 10.0);
    }

    #[test]
    fn iter_yields_insertion_order() {
        let mut store = PointStore::<f32, 4>::new();
        store.append([0.0; 4], 1.0);
        store.append([1.0; 4], 2.0);
        store.append([2.0; 4], 3.0);

        let ids: Vec<usize> = store.iter().map(|(id, _, _)| id).collect();
        let values: Vec<f32> = store.iter().map(|(_, _, v)| v).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn clear_resets_ids() {
        let mut store = PointStore::<f64, 3>::new();
        store.append([0.0; 3], 1.0);
        store.append([1.0; 3], 2.0);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.append([3.0; 3], 4.0), 0);
    }
}
