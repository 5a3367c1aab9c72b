/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the scalar precision trait shared by the f32 and f64 index instantiations.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{Debug, Display};

/// Storage precision of a spatial index instantiation.
///
/// Coordinates and values are stored in `Self`; all geometry and linear
/// algebra are computed in `f64` and converted at the boundary, so the two
/// instantiations share one implementation.
pub trait SpatialScalar:
    Copy + PartialOrd + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Precision tag recorded in snapshots and checked on load.
    const PRECISION: &'static str;

    /// Converts from the `f64` computation domain into storage.
    fn from_f64(value: f64) -> Self;

    /// Converts from storage into the `f64` computation domain.
    fn to_f64(self) -> f64;

    /// The additive identity.
    fn zero() -> Self;

    /// Sentinel for a missing value.
    fn nan() -> Self;

    /// Sentinel for a missing distance.
    fn infinity() -> Self;

    /// Returns true when the value is neither infinite nor NaN.
    fn is_finite(self) -> bool;
}

impl SpatialScalar for f64 {
    const PRECISION: &'static str = "float64";

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn nan() -> Self {
        f64::NAN
    }

    #[inline(always)]
    fn infinity() -> Self {
        f64::INFINITY
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

impl SpatialScalar for f32 {
    const PRECISION: &'static str = "float32";

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn nan() -> Self {
        f32::NAN
    }

    #[inline(always)]
    fn infinity() -> Self {
        f32::INFINITY
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_tags_differ() {
        assert_eq!(<f64 as SpatialScalar>::PRECISION, "float64");
        assert_eq!(<f32 as SpatialScalar>::PRECISION, "float32");
    }

    #[test]
    fn round_trips_through_f64() {
        let x = 1.5f32;
        assert_eq!(f32::from_f64(x.to_f64()), x);

        let y = -7.25f64;
        assert_eq!(f64::from_f64(y.to_f64()), y);
    }

    #[test]
    fn sentinels() {
        assert!(<f32 as SpatialScalar>::nan().is_nan());
        assert!(!<f64 as SpatialScalar>::infinity().is_finite());
        assert!(<f64 as SpatialScalar>::zero().is_finite());
    }
}
