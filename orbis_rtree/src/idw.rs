/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the inverse distance weighting estimate for one query position.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # idw
//!
//! Inverse distance weighting over one neighbour set: weights are the
//! reciprocal distances raised to the power `p`, so nearer observations
//! dominate. A neighbour at distance exactly zero short-circuits to its own
//! value, which both honours the exact-match contract and avoids the
//! division by zero.

/// Computes the IDW estimate for one query position.
///
/// `neighbours` holds `(distance, value)` pairs sorted ascending by
/// distance. Returns the estimate and the number of neighbours it used:
/// `(value, 1)` for an exact zero-distance match, `(NaN, 0)` for an empty
/// set.
pub(crate) fn idw_estimate(neighbours: &[(f64, f64)], p: u32) -> (f64, usize) {
    if neighbours.is_empty() {
        return (f64::NAN, 0);
    }

    // The set is sorted, so an exact match can only sit in front.
    let (first_distance, first_value) = neighbours[0];
    if first_distance == 0.0 {
        return (first_value, 1);
    }

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for &(distance, value) in neighbours {
        let weight = 1.0 / distance.powi(p as i32);
        weighted_sum += weight * value;
        weight_sum += weight;
    }

    (weighted_sum / weight_sum, neighbours.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_missing() {
        let (estimate, count) = idw_estimate(&[], 2);
        assert!(estimate.is_nan());
        assert_eq!(count, 0);
    }

    #[test]
    fn exact_match_short_circuits() {
        let neighbours = [(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)];
        for p in [1, 2, 5] {
            let (estimate, count) = idw_estimate(&neighbours, p);
            assert_eq!(estimate, 10.0);
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn weights_follow_inverse_square_distance() {
        // Two neighbours at distances 1 and 2 with p = 2: weights 1 and 1/4.
        let neighbours = [(1.0, 10.0), (2.0, 50.0)];
        let (estimate, count) = idw_estimate(&neighbours, 2);
        let expected = (1.0 * 10.0 + 0.25 * 50.0) / 1.25;
        assert!((estimate - expected).abs() < 1e-12);
        assert_eq!(count, 2);
    }

    #[test]
    fn higher_power_localizes_the_estimate() {
        let neighbours = [(1.0, 0.0), (3.0, 100.0)];
        let (flat, _) = idw_estimate(&neighbours, 1);
        let (sharp, _) = idw_estimate(&neighbours, 6);
        // Raising p pulls the estimate toward the nearest value.
        assert!(sharp < flat);
        assert!(sharp < 1.0);
    }

    #[test]
    fn equidistant_neighbours_average() {
        let neighbours = [(2.0, 10.0), (2.0, 30.0)];
        let (estimate, _) = idw_estimate(&neighbours, 2);
        assert!((estimate - 20.0).abs() < 1e-12);
    }
}
