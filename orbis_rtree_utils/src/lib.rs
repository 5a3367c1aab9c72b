/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernel utilities, the scalar precision trait, and helpers for the orbis_rtree crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`orbis_rtree`] crate
//!
//! Holds the radial basis function kernel registry, the scalar precision
//! trait shared by the `f32`/`f64` index instantiations, and small numeric
//! helpers (distances, extents, pairwise statistics) used by the spatial
//! index and its interpolators.

mod kernels;
mod scalar;
mod utils;

pub use {
    kernels::{
        CubicKernel, GaussianKernel, InverseMultiquadricKernel, KernelFromParams, KernelParams,
        KernelParamsBuilder, KernelType, LinearKernel, MultiquadricKernel, ThinPlateKernel,
        kernel_phi,
    },
    scalar::SpatialScalar,
    utils::{get_distance, get_distance_sq, mean_pairwise_distance, point_extents},
};
