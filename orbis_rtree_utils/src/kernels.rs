/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the concrete RBF kernel functions and their runtime dispatch helpers.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # kernels
//!
//! The closed set of radial basis functions supported by the interpolation
//! engine. Each kernel is a concrete type with an inlined `phi(r)`; the
//! [`KernelType`] selector and [`kernel_phi`] dispatcher resolve the concrete
//! type once per call site, keeping the hot evaluation loops monomorphic.

use serde::{Deserialize, Serialize};

/// Runtime kernel selector.
///
/// The `gaussian`, `multiquadric` and `inverse_multiquadric` kernels carry an
/// adjustable shape parameter `epsilon`; `cubic`, `linear` and `thin_plate`
/// do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelType {
    Cubic,
    Gaussian,
    InverseMultiquadric,
    Linear,
    Multiquadric,
    ThinPlate,
}

impl KernelType {
    /// Returns true when the kernel accepts the `epsilon` shape parameter.
    #[inline(always)]
    pub fn is_adjustable(self) -> bool {
        matches!(
            self,
            KernelType::Gaussian | KernelType::InverseMultiquadric | KernelType::Multiquadric
        )
    }
}

/// Defines the [`KernelType`] to use, along with the shape parameter value
/// for the adjustable kernel family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KernelParams {
    /// KernelType enum variant to use.
    pub kernel_type: KernelType,

    /// Shape parameter controlling the width of the basis functions.
    /// Only read by the adjustable kernels.
    pub epsilon: f64,
}

impl KernelParams {
    /// Begins building a [`KernelParams`] instance for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> KernelParamsBuilder {
        KernelParamsBuilder {
            kernel_type,
            epsilon: 1.0,
        }
    }
}

/// Builder for [`KernelParams`] that provides sensible defaults.
#[derive(Debug, Clone, Copy)]
pub struct KernelParamsBuilder {
    kernel_type: KernelType,
    epsilon: f64,
}

impl KernelParamsBuilder {
    /// Sets the `epsilon` shape parameter on the builder.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Finalises the builder into a [`KernelParams`] value.
    pub fn build(self) -> KernelParams {
        assert!(self.epsilon > 0.0);
        KernelParams {
            kernel_type: self.kernel_type,
            epsilon: self.epsilon,
        }
    }
}

/// Converts a shared [`KernelParams`] configuration into a concrete kernel type.
pub trait KernelFromParams: Sized {
    /// Constructs `Self` from a set of uniform kernel parameters.
    fn from_params(p: &KernelParams) -> Self;
}

/// Cubic RBF kernel with `phi(r) = r^3`.
#[derive(Clone, Debug, Copy)]
pub struct CubicKernel;

impl CubicKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        r.powi(3)
    }
}

impl KernelFromParams for CubicKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        CubicKernel
    }
}

/// Linear RBF kernel with `phi(r) = r`.
#[derive(Clone, Debug, Copy)]
pub struct LinearKernel;

impl LinearKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        r
    }
}

impl KernelFromParams for LinearKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        LinearKernel
    }
}

/// Thin plate spline RBF kernel with `phi(r) = r^2 log r`, `phi(0) = 0`.
#[derive(Clone, Debug, Copy)]
pub struct ThinPlateKernel;

impl ThinPlateKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        match r.abs() < f64::EPSILON {
            true => 0.0,
            false => r.powi(2) * r.ln(),
        }
    }
}

impl KernelFromParams for ThinPlateKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        ThinPlateKernel
    }
}

/// Gaussian RBF kernel with `phi(r) = exp(-(r/epsilon)^2)`.
#[derive(Clone, Debug, Copy)]
pub struct GaussianKernel {
    pub epsilon: f64,
}

impl GaussianKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        let t = r / self.epsilon;
        (-t * t).exp()
    }
}

impl KernelFromParams for GaussianKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        GaussianKernel { epsilon: p.epsilon }
    }
}

/// Multiquadric RBF kernel with `phi(r) = sqrt(1 + (r/epsilon)^2)`.
#[derive(Clone, Debug, Copy)]
pub struct MultiquadricKernel {
    pub epsilon: f64,
}

impl MultiquadricKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        let t = r / self.epsilon;
        (1.0 + t * t).sqrt()
    }
}

impl KernelFromParams for MultiquadricKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        MultiquadricKernel { epsilon: p.epsilon }
    }
}

/// Inverse multiquadric RBF kernel with `phi(r) = 1 / sqrt(1 + (r/epsilon)^2)`.
#[derive(Clone, Debug, Copy)]
pub struct InverseMultiquadricKernel {
    pub epsilon: f64,
}

impl InverseMultiquadricKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        let t = r / self.epsilon;
        1.0 / (1.0 + t * t).sqrt()
    }
}

impl KernelFromParams for InverseMultiquadricKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        InverseMultiquadricKernel { epsilon: p.epsilon }
    }
}

/// Evaluates the selected kernel function at distance `r`.
#[inline(always)]
pub fn kernel_phi(r: f64, params: &KernelParams) -> f64 {
    match params.kernel_type {
        KernelType::Cubic => CubicKernel::from_params(params).phi(r),
        KernelType::Gaussian => GaussianKernel::from_params(params).phi(r),
        KernelType::InverseMultiquadric => InverseMultiquadricKernel::from_params(params).phi(r),
        KernelType::Linear => LinearKernel::from_params(params).phi(r),
        KernelType::Multiquadric => MultiquadricKernel::from_params(params).phi(r),
        KernelType::ThinPlate => ThinPlateKernel::from_params(params).phi(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustable_partition() {
        for kernel_type in [
            KernelType::Gaussian,
            KernelType::InverseMultiquadric,
            KernelType::Multiquadric,
        ] {
            assert!(kernel_type.is_adjustable());
        }
        for kernel_type in [KernelType::Cubic, KernelType::Linear, KernelType::ThinPlate] {
            assert!(!kernel_type.is_adjustable());
        }
    }

    #[test]
    fn phi_at_zero() {
        let params = KernelParams::builder(KernelType::Multiquadric)
            .epsilon(2.0)
            .build();

        assert_eq!(CubicKernel.phi(0.0), 0.0);
        assert_eq!(LinearKernel.phi(0.0), 0.0);
        assert_eq!(ThinPlateKernel.phi(0.0), 0.0);
        assert_eq!(GaussianKernel::from_params(&params).phi(0.0), 1.0);
        assert_eq!(MultiquadricKernel::from_params(&params).phi(0.0), 1.0);
        assert_eq!(InverseMultiquadricKernel::from_params(&params).phi(0.0), 1.0);
    }

    #[test]
    fn phi_known_values() {
        assert_eq!(CubicKernel.phi(2.0), 8.0);
        assert_eq!(LinearKernel.phi(3.5), 3.5);

        // thin plate at r = e: r^2 * ln(r) = e^2
        let e = std::f64::consts::E;
        assert!((ThinPlateKernel.phi(e) - e * e).abs() < 1e-12);

        // multiquadric with epsilon = r gives sqrt(2)
        let mq = MultiquadricKernel { epsilon: 2.0 };
        assert!((mq.phi(2.0) - 2.0_f64.sqrt()).abs() < 1e-12);

        let imq = InverseMultiquadricKernel { epsilon: 2.0 };
        assert!((imq.phi(2.0) - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);

        let gauss = GaussianKernel { epsilon: 1.0 };
        assert!((gauss.phi(1.0) - (-1.0_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn dispatch_matches_concrete_kernels() {
        let r = 1.75;
        for kernel_type in [
            KernelType::Cubic,
            KernelType::Gaussian,
            KernelType::InverseMultiquadric,
            KernelType::Linear,
            KernelType::Multiquadric,
            KernelType::ThinPlate,
        ] {
            let params = KernelParams::builder(kernel_type).epsilon(0.5).build();
            let expected = match kernel_type {
                KernelType::Cubic => CubicKernel.phi(r),
                KernelType::Gaussian => GaussianKernel { epsilon: 0.5 }.phi(r),
                KernelType::InverseMultiquadric => {
                    InverseMultiquadricKernel { epsilon: 0.5 }.phi(r)
                }
                KernelType::Linear => LinearKernel.phi(r),
                KernelType::Multiquadric => MultiquadricKernel { epsilon: 0.5 }.phi(r),
                KernelType::ThinPlate => ThinPlateKernel.phi(r),
            };
            assert_eq!(kernel_phi(r, &params), expected);
        }
    }
}
