/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the query and interpolation settings types and their builders.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares the query and interpolation settings types and their builders.
//!
//! Defaults follow the index's external contract: `k = 4` for raw
//! neighbour queries, `k = 9` and `p = 2` for interpolation, the `within`
//! constraint enabled, and `num_threads = 0` (use every hardware thread;
//! `1` forces a strictly sequential batch, which is useful for debugging
//! and produces output identical to any parallel run).

use orbis_rtree_utils::KernelType;
use serde::{Deserialize, Serialize};

/// The radial basis functions selectable for
/// [`radial_basis_function`](crate::GeodeticIndex::radial_basis_function)
/// interpolation, `r` being the Euclidean distance between two points.
///
/// * `Cubic`: `phi(r) = r^3`
/// * `Gaussian`: `phi(r) = exp(-(r/eps)^2)`
/// * `InverseMultiquadric`: `phi(r) = 1/sqrt(1 + (r/eps)^2)`
/// * `Linear`: `phi(r) = r`
/// * `Multiquadric`: `phi(r) = sqrt(1 + (r/eps)^2)` (the default)
/// * `ThinPlate`: `phi(r) = r^2 ln(r)`
///
/// Only the gaussian/multiquadric family accepts the `epsilon` shape
/// parameter; supplying it for the other kernels is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RbfKernel {
    Cubic,
    Gaussian,
    InverseMultiquadric,
    Linear,
    Multiquadric,
    ThinPlate,
}

impl RbfKernel {
    /// Returns true when the kernel accepts the `epsilon` shape parameter.
    pub fn is_adjustable(self) -> bool {
        KernelType::from(self).is_adjustable()
    }
}

impl Default for RbfKernel {
    fn default() -> Self {
        RbfKernel::Multiquadric
    }
}

impl From<RbfKernel> for KernelType {
    /// Converts the public kernel selector into the registry's
    /// [`KernelType`], allowing `.into()` when passing settings into
    /// lower-level utility functions.
    fn from(v: RbfKernel) -> Self {
        match v {
            RbfKernel::Cubic => KernelType::Cubic,
            RbfKernel::Gaussian => KernelType::Gaussian,
            RbfKernel::InverseMultiquadric => KernelType::InverseMultiquadric,
            RbfKernel::Linear => KernelType::Linear,
            RbfKernel::Multiquadric => KernelType::Multiquadric,
            RbfKernel::ThinPlate => KernelType::ThinPlate,
        }
    }
}

/// Settings for a raw k-nearest-neighbour query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Number of nearest neighbours to search. `0` yields empty output.
    pub k: usize,

    /// When true, positions whose neighbour set does not surround them
    /// (axis-aligned bounding-box containment, boundary inclusive) report
    /// no result, preventing extrapolation.
    pub within: bool,

    /// Worker threads for the batch. `0` uses all hardware threads, `1`
    /// runs strictly sequentially.
    pub num_threads: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            k: 4,
            within: true,
            num_threads: 0,
        }
    }
}

impl QuerySettings {
    /// Returns a new [`QuerySettingsBuilder`] with default values.
    pub fn builder() -> QuerySettingsBuilder {
        QuerySettingsBuilder {
            settings: Self::default(),
        }
    }
}

/// A convenience builder for constructing a [`QuerySettings`] instance.
#[derive(Debug, Clone, Copy)]
pub struct QuerySettingsBuilder {
    settings: QuerySettings,
}

impl QuerySettingsBuilder {
    /// Sets the number of neighbours to search.
    pub fn k(mut self, k: usize) -> Self {
        self.settings.k = k;
        self
    }

    /// Enables or disables the `within` containment constraint.
    pub fn within(mut self, within: bool) -> Self {
        self.settings.within = within;
        self
    }

    /// Sets the worker thread count.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.settings.num_threads = num_threads;
        self
    }

    /// Builds and returns the configured [`QuerySettings`].
    pub fn build(self) -> QuerySettings {
        self.settings
    }
}

/// Settings for inverse distance weighting interpolation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdwSettings {
    /// Maximum search radius in meters; `None` leaves the search unbounded.
    /// Neighbours farther than the radius are discarded, never padded.
    pub radius: Option<f64>,

    /// Number of nearest neighbours used for the estimate. Must be >= 1.
    pub k: usize,

    /// Power applied to the inverse distances. Must be >= 1.
    pub p: u32,

    /// See [`QuerySettings::within`].
    pub within: bool,

    /// See [`QuerySettings::num_threads`].
    pub num_threads: usize,
}

impl Default for IdwSettings {
    fn default() -> Self {
        Self {
            radius: None,
            k: 9,
            p: 2,
            within: true,
            num_threads: 0,
        }
    }
}

impl IdwSettings {
    /// Returns a new [`IdwSettingsBuilder`] with default values.
    pub fn builder() -> IdwSettingsBuilder {
        IdwSettingsBuilder {
            settings: Self::default(),
        }
    }
}

/// A convenience builder for constructing an [`IdwSettings`] instance.
#[derive(Debug, Clone, Copy)]
pub struct IdwSettingsBuilder {
    settings: IdwSettings,
}

impl IdwSettingsBuilder {
    /// Sets the maximum search radius in meters.
    pub fn radius(mut self, radius: f64) -> Self {
        self.settings.radius = Some(radius);
        self
    }

    /// Sets the number of neighbours used for the estimate.
    pub fn k(mut self, k: usize) -> Self {
        self.settings.k = k;
        self
    }

    /// Sets the inverse distance power.
    pub fn p(mut self, p: u32) -> Self {
        self.settings.p = p;
        self
    }

    /// Enables or disables the `within` containment constraint.
    pub fn within(mut self, within: bool) -> Self {
        self.settings.within = within;
        self
    }

    /// Sets the worker thread count.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.settings.num_threads = num_threads;
        self
    }

    /// Builds and returns the configured [`IdwSettings`].
    pub fn build(self) -> IdwSettings {
        self.settings
    }
}

/// Settings for radial basis function interpolation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RbfSettings {
    /// Maximum search radius in meters; `None` leaves the search unbounded.
    pub radius: Option<f64>,

    /// Number of nearest neighbours used for the local solve. Must be >= 1.
    pub k: usize,

    /// The radial basis function to use.
    pub kernel: RbfKernel,

    /// Shape parameter for the adjustable kernels. When `None` it defaults,
    /// per position, to the mean pairwise distance among that position's
    /// neighbours. Rejected for the non-adjustable kernels.
    pub epsilon: Option<f64>,

    /// Smoothing added to the kernel matrix diagonal. `0` interpolates
    /// exactly; larger values trade exactness for numerical stability.
    pub smooth: f64,

    /// See [`QuerySettings::within`].
    pub within: bool,

    /// See [`QuerySettings::num_threads`].
    pub num_threads: usize,
}

impl Default for RbfSettings {
    fn default() -> Self {
        Self {
            radius: None,
            k: 9,
            kernel: RbfKernel::Multiquadric,
            epsilon: None,
            smooth: 0.0,
            within: true,
            num_threads: 0,
        }
    }
}

impl RbfSettings {
    /// Returns a new [`RbfSettingsBuilder`] with default values.
    pub fn builder() -> RbfSettingsBuilder {
        RbfSettingsBuilder {
            settings: Self::default(),
        }
    }
}

/// A convenience builder for constructing an [`RbfSettings`] instance.
#[derive(Debug, Clone, Copy)]
pub struct RbfSettingsBuilder {
    settings: RbfSettings,
}

impl RbfSettingsBuilder {
    /// Sets the maximum search radius in meters.
    pub fn radius(mut self, radius: f64) -> Self {
        self.settings.radius = Some(radius);
        self
    }

    /// Sets the number of neighbours used for the local solve.
    pub fn k(mut self, k: usize) -> Self {
        self.settings.k = k;
        self
    }

    /// Sets the radial basis function.
    pub fn kernel(mut self, kernel: RbfKernel) -> Self {
        self.settings.kernel = kernel;
        self
    }

    /// Sets the shape parameter for the adjustable kernels.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.settings.epsilon = Some(epsilon);
        self
    }

    /// Sets the smoothing term.
    pub fn smooth(mut self, smooth: f64) -> Self {
        self.settings.smooth = smooth;
        self
    }

    /// Enables or disables the `within` containment constraint.
    pub fn within(mut self, within: bool) -> Self {
        self.settings.within = within;
        self
    }

    /// Sets the worker thread count.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.settings.num_threads = num_threads;
        self
    }

    /// Builds and returns the configured [`RbfSettings`].
    pub fn build(self) -> RbfSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_external_contract() {
        let query = QuerySettings::default();
        assert_eq!(query.k, 4);
        assert!(query.within);
        assert_eq!(query.num_threads, 0);

        let idw = IdwSettings::default();
        assert_eq!((idw.k, idw.p), (9, 2));
        assert!(idw.radius.is_none());

        let rbf = RbfSettings::default();
        assert_eq!(rbf.kernel, RbfKernel::Multiquadric);
        assert!(rbf.epsilon.is_none());
        assert_eq!(rbf.smooth, 0.0);
        assert_eq!(rbf.k, 9);
    }

    #[test]
    fn builders_override_fields() {
        let settings = RbfSettings::builder()
            .kernel(RbfKernel::Gaussian)
            .epsilon(2.5)
            .smooth(0.1)
            .k(12)
            .radius(50_000.0)
            .within(false)
            .num_threads(2)
            .build();

        assert_eq!(settings.kernel, RbfKernel::Gaussian);
        assert_eq!(settings.epsilon, Some(2.5));
        assert_eq!(settings.smooth, 0.1);
        assert_eq!(settings.k, 12);
        assert_eq!(settings.radius, Some(50_000.0));
        assert!(!settings.within);
        assert_eq!(settings.num_threads, 2);
    }

    #[test]
    fn adjustable_kernels() {
        assert!(RbfKernel::Gaussian.is_adjustable());
        assert!(RbfKernel::Multiquadric.is_adjustable());
        assert!(RbfKernel::InverseMultiquadric.is_adjustable());
        assert!(!RbfKernel::Cubic.is_adjustable());
        assert!(!RbfKernel::Linear.is_adjustable());
        assert!(!RbfKernel::ThinPlate.is_adjustable());
    }
}
