/////////////////////////////////////////////////////////////////////////////////////////////
//
// Adds the symmetric dense solver used for the local RBF weight systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # linalg
//!
//! The kernel matrices assembled for RBF interpolation are symmetric and,
//! for the positive-definite kernel family or any positive smoothing term,
//! SPD. The solver here tries a Cholesky LLᵀ factorisation first and falls
//! back to a Bunch–Kaufman LDLᵀ for the symmetric-indefinite kernels
//! (multiquadric, thin plate). A genuinely singular system surfaces as a
//! non-finite solution, which callers map to a missing result.

use faer::linalg::solvers::{Lblt, Llt, Solve};
use faer::prelude::*;
use faer::{Mat, MatRef, Side};

/// Symmetric dense solver with an LLᵀ fast path.
pub(crate) enum SymmetricSolver {
    Llt(Llt<f64>),
    Lblt(Lblt<f64>),
}

impl SymmetricSolver {
    /// Try LLᵀ first. If it fails (matrix not SPD / numerically indefinite),
    /// fall back to Bunch–Kaufman LDLᵀ.
    pub fn new(a: MatRef<'_, f64>) -> Self {
        match a.llt(Side::Lower) {
            Ok(llt) => SymmetricSolver::Llt(llt),
            Err(_) => SymmetricSolver::Lblt(a.lblt(Side::Lower)),
        }
    }

    /// Solves `A x = rhs`, returning `None` when the factorisation produced
    /// a non-finite solution (singular or ill-conditioned beyond use).
    pub fn try_solve(&self, rhs: &Mat<f64>) -> Option<Mat<f64>> {
        let solution = match self {
            SymmetricSolver::Llt(solver) => solver.solve(rhs),
            SymmetricSolver::Lblt(solver) => solver.solve(rhs),
        };

        let is_finite = solution.col(0).iter().all(|x| x.is_finite());
        match is_finite {
            true => Some(solution),
            false => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic SPD matrix: A = M Mᵀ + alpha I.
    fn make_spd(n: usize, alpha: f64) -> Mat<f64> {
        let mut m = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let x = (i as f64 + 1.0) * (j as f64 + 2.0);
                m[(i, j)] = (x.sin() + 2.0 * x.cos()) / (1.0 + (i + j + 1) as f64);
            }
        }
        let mut a = &m * m.transpose();
        for i in 0..n {
            a[(i, i)] += alpha.max(1e-3);
        }
        a
    }

    fn residual_norm(a: &Mat<f64>, x: &Mat<f64>, b: &Mat<f64>) -> f64 {
        let r = a * x - b;
        r.col(0).iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    #[test]
    fn spd_system_uses_cholesky_and_solves() {
        let a = make_spd(9, 1e-2);
        let b = Mat::<f64>::from_fn(9, 1, |i, _| ((i + 1) as f64).sin());

        let solver = SymmetricSolver::new(a.as_ref());
        assert!(matches!(solver, SymmetricSolver::Llt(_)));

        let x = solver.try_solve(&b).expect("SPD system must solve");
        assert!(residual_norm(&a, &x, &b) < 1e-9);
    }

    #[test]
    fn indefinite_system_falls_back_and_still_solves() {
        // Symmetric but indefinite: eigenvalues of opposite sign.
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 0.0;
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 0.0;
        let b = Mat::<f64>::from_fn(2, 1, |i, _| (i + 1) as f64);

        let solver = SymmetricSolver::new(a.as_ref());
        assert!(matches!(solver, SymmetricSolver::Lblt(_)));

        let x = solver.try_solve(&b).expect("indefinite system is regular");
        assert!(residual_norm(&a, &x, &b) < 1e-12);
    }

    #[test]
    fn singular_system_yields_none() {
        // Rank-one matrix with an inconsistent right-hand side.
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 1.0;
        let mut b = Mat::<f64>::zeros(2, 1);
        b[(0, 0)] = 1.0;
        b[(1, 0)] = 2.0;

        let solver = SymmetricSolver::new(a.as_ref());
        assert!(solver.try_solve(&b).is_none());
    }
}
