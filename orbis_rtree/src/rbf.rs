/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the local radial basis function solve for one query position.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # rbf
//!
//! Local radial basis function interpolation over one neighbour set: an
//! m×m kernel matrix `K[i][j] = phi(|p_i - p_j|)` (plus an optional
//! smoothing term on the diagonal) is solved for weights reproducing the
//! neighbour values, then the estimate is the weighted kernel sum evaluated
//! at the query point. With `smooth = 0` and a regular system the estimate
//! interpolates the neighbour values exactly.
//!
//! The gaussian/multiquadric family without smoothing can produce an
//! ill-conditioned system; a failed or non-finite solve yields a missing
//! (NaN) estimate for that position only.

use crate::linalg::SymmetricSolver;
use faer::Mat;
use orbis_rtree_utils::{
    KernelParams, KernelType, get_distance, kernel_phi, mean_pairwise_distance,
};

/// Resolves the shape parameter for one neighbour set.
///
/// The documented default for the adjustable kernels is the mean pairwise
/// distance among the neighbours, computed here as an explicit pre-step.
/// With fewer than two neighbours the mean is undefined and the value is
/// inert (a 1×1 system evaluates `phi(0)` only), so any positive constant
/// serves.
#[inline(always)]
pub(crate) fn resolve_epsilon<const N: usize>(
    epsilon: Option<f64>,
    points: &[[f64; N]],
) -> f64 {
    match epsilon {
        Some(value) => value,
        None => mean_pairwise_distance(points).unwrap_or(1.0),
    }
}

/// Computes the RBF estimate for one query position.
///
/// `points` and `values` are the neighbour coordinates and values; both
/// have length m. Returns the estimate and the number of neighbours in the
/// solve: `(NaN, 0)` for an empty set, `(NaN, m)` when the linear system is
/// singular or ill-conditioned beyond use.
pub(crate) fn rbf_estimate<const N: usize>(
    query: &[f64; N],
    points: &[[f64; N]],
    values: &[f64],
    kernel_type: KernelType,
    epsilon: Option<f64>,
    smooth: f64,
) -> (f64, usize) {
    let m = points.len();
    if m == 0 {
        return (f64::NAN, 0);
    }

    let params = KernelParams::builder(kernel_type)
        .epsilon(resolve_epsilon(epsilon, points))
        .build();

    // Symmetric kernel matrix with the smoothing term on the diagonal.
    let mut kernel_matrix = Mat::<f64>::zeros(m, m);
    for j in 0..m {
        for i in j..m {
            let mut k_val = kernel_phi(get_distance(&points[i], &points[j]), &params);
            if i == j {
                k_val += smooth;
            }
            kernel_matrix[(i, j)] = k_val;
            kernel_matrix[(j, i)] = k_val;
        }
    }

    let rhs = Mat::<f64>::from_fn(m, 1, |i, _| values[i]);

    let solver = SymmetricSolver::new(kernel_matrix.as_ref());
    let Some(weights) = solver.try_solve(&rhs) else {
        return (f64::NAN, m);
    };

    let estimate: f64 = (0..m)
        .map(|i| weights[(i, 0)] * kernel_phi(get_distance(query, &points[i]), &params))
        .sum();

    match estimate.is_finite() {
        true => (estimate, m),
        false => (f64::NAN, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERNELS: [KernelType; 6] = [
        KernelType::Cubic,
        KernelType::Gaussian,
        KernelType::InverseMultiquadric,
        KernelType::Linear,
        KernelType::Multiquadric,
        KernelType::ThinPlate,
    ];

    fn sample_points() -> (Vec<[f64; 3]>, Vec<f64>) {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.2],
            [0.0, 1.0, -0.1],
            [1.0, 1.0, 0.3],
            [0.4, 0.6, 0.0],
        ];
        let values = points
            .iter()
            .map(|p| 1.0 + 2.0 * p[0] - 0.5 * p[1] + p[2])
            .collect();
        (points, values)
    }

    #[test]
    fn empty_set_is_missing() {
        let (estimate, count) =
            rbf_estimate::<3>(&[0.0; 3], &[], &[], KernelType::Multiquadric, None, 0.0);
        assert!(estimate.is_nan());
        assert_eq!(count, 0);
    }

    #[test]
    fn reproduces_values_at_neighbour_positions() {
        let (points, values) = sample_points();
        for kernel_type in KERNELS {
            for (point, value) in points.iter().zip(values.iter()) {
                let (estimate, count) =
                    rbf_estimate(point, &points, &values, kernel_type, None, 0.0);
                assert_eq!(count, points.len());
                assert!(
                    (estimate - value).abs() < 1e-6,
                    "{:?}: {} vs {}",
                    kernel_type,
                    estimate,
                    value
                );
            }
        }
    }

    #[test]
    fn single_neighbour_returns_its_value() {
        let points = vec![[2.0, 3.0, 4.0]];
        let values = vec![7.5];
        for kernel_type in KERNELS {
            let (estimate, count) =
                rbf_estimate(&[2.0, 3.0, 4.0], &points, &values, kernel_type, None, 0.0);
            assert_eq!(count, 1);
            assert!((estimate - 7.5).abs() < 1e-9, "{:?}", kernel_type);
        }
    }

    #[test]
    fn duplicate_neighbours_without_smoothing_fail_cleanly() {
        // Two identical rows make the kernel matrix exactly singular.
        let points = vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let values = vec![1.0, 2.0, 3.0];
        let (estimate, count) = rbf_estimate(
            &[0.5, 0.0, 0.0],
            &points,
            &values,
            KernelType::Gaussian,
            None,
            0.0,
        );
        assert!(estimate.is_nan());
        assert_eq!(count, 3);
    }

    #[test]
    fn smoothing_regularizes_a_singular_system() {
        let points = vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let values = vec![1.0, 1.0, 3.0];
        let (estimate, count) = rbf_estimate(
            &[0.5, 0.0, 0.0],
            &points,
            &values,
            KernelType::Gaussian,
            None,
            1e-6,
        );
        assert!(estimate.is_finite());
        assert_eq!(count, 3);
    }

    #[test]
    fn explicit_epsilon_changes_the_adjustable_fit() {
        let (points, values) = sample_points();
        let query = [0.5, 0.5, 0.1];
        let (a, _) = rbf_estimate(&query, &points, &values, KernelType::Gaussian, None, 0.0);
        let (b, _) = rbf_estimate(
            &query,
            &points,
            &values,
            KernelType::Gaussian,
            Some(10.0),
            0.0,
        );
        assert!(a.is_finite() && b.is_finite());
        assert!((a - b).abs() > 1e-12);
    }

    #[test]
    fn epsilon_default_is_mean_pairwise_distance() {
        let points = [[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]];
        // One pair at distance 5.
        assert_eq!(resolve_epsilon(None, &points), 5.0);
        assert_eq!(resolve_epsilon(Some(2.0), &points), 2.0);
        assert_eq!(resolve_epsilon::<3>(None, &points[..1]), 1.0);
    }
}
