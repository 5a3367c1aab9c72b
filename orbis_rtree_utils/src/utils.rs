/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies distance, extents, and pairwise statistics helpers for point sets.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use itertools::Itertools;

/// Returns the squared Euclidean distance between two points.
#[inline(always)]
pub fn get_distance_sq(target: &[f64], source: &[f64]) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}

/// Calculates the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use orbis_rtree_utils::get_distance;
///
/// let dist = get_distance(&[1.0, 2.0], &[4.0, 6.0]);
/// assert_eq!(dist, 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: &[f64], source: &[f64]) -> f64 {
    get_distance_sq(target, source).sqrt()
}

/// Computes the axis-aligned bounding box of a point set as componentwise
/// `(mins, maxs)` corners, or `None` for an empty set.
///
/// # Examples
///
/// ```
/// use orbis_rtree_utils::point_extents;
///
/// let points = [[1.0, 2.0], [3.0, -1.0], [0.5, 4.0]];
/// let (mins, maxs) = point_extents(&points).unwrap();
/// assert_eq!(mins, [0.5, -1.0]);
/// assert_eq!(maxs, [3.0, 4.0]);
/// ```
#[inline(always)]
pub fn point_extents<const N: usize>(points: &[[f64; N]]) -> Option<([f64; N], [f64; N])> {
    let first = points.first()?;
    let mut mins = *first;
    let mut maxs = *first;

    for point in points.iter().skip(1) {
        for dim in 0..N {
            if point[dim] < mins[dim] {
                mins[dim] = point[dim];
            }
            if point[dim] > maxs[dim] {
                maxs[dim] = point[dim];
            }
        }
    }

    Some((mins, maxs))
}

/// Returns the mean Euclidean distance over all unordered point pairs, or
/// `None` when the set holds fewer than two points.
#[inline(always)]
pub fn mean_pairwise_distance<const N: usize>(points: &[[f64; N]]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }

    let num_pairs = points.len() * (points.len() - 1) / 2;
    let total: f64 = points
        .iter()
        .tuple_combinations()
        .map(|(a, b)| get_distance(a, b))
        .sum();

    Some(total / num_pairs as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_and_square_agree() {
        let a = [0.0, 3.0, 0.0];
        let b = [4.0, 0.0, 0.0];
        assert_eq!(get_distance_sq(&a, &b), 25.0);
        assert_eq!(get_distance(&a, &b), 5.0);
        assert_eq!(get_distance(&a, &a), 0.0);
    }

    #[test]
    fn extents_of_empty_set_is_none() {
        let points: [[f64; 3]; 0] = [];
        assert!(point_extents(&points).is_none());
    }

    #[test]
    fn extents_of_single_point_is_degenerate() {
        let points = [[1.0, 2.0, 3.0]];
        let (mins, maxs) = point_extents(&points).unwrap();
        assert_eq!(mins, maxs);
        assert_eq!(mins, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn mean_pairwise_distance_unit_segment() {
        // Three collinear points at 0, 1, 2: pairwise distances 1, 2, 1.
        let points = [[0.0], [1.0], [2.0]];
        let mean = mean_pairwise_distance(&points).unwrap();
        assert!((mean - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mean_pairwise_distance_needs_two_points() {
        assert!(mean_pairwise_distance::<3>(&[]).is_none());
        assert!(mean_pairwise_distance(&[[0.0, 0.0, 0.0]]).is_none());
    }
}
