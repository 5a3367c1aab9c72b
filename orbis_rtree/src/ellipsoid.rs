/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the reference ellipsoid and the geodetic to Cartesian (ECEF) projection.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # ellipsoid
//!
//! The reference ellipsoid bound to a spatial index, and the projection that
//! turns geodetic coordinates (longitude, latitude, altitude) into the
//! Cartesian embedding the index operates in. Euclidean distance in the
//! embedding is expressed in the ellipsoid's length unit (meters for
//! Earth-like ellipsoids).
//!
//! The inverse projection uses Bowring's closed-form latitude recovery,
//! which is accurate to well below a millimeter for terrestrial altitudes.

use serde::{Deserialize, Serialize};

/// Reference ellipsoid defined by its semi-major axis (meters) and
/// flattening.
///
/// Immutable once constructed and shared by every operation of the index it
/// is bound to. Latitudes outside `[-90, 90]` degrees are not rejected; the
/// projection stays mathematically defined but loses geodetic meaning, and
/// validation belongs upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    semi_major_axis: f64,
    flattening: f64,
}

impl Ellipsoid {
    /// Creates an ellipsoid from a semi-major axis in meters and a
    /// flattening in `[0, 1)`.
    pub fn new(semi_major_axis: f64, flattening: f64) -> Self {
        assert!(semi_major_axis > 0.0);
        assert!((0.0..1.0).contains(&flattening));
        Self {
            semi_major_axis,
            flattening,
        }
    }

    /// The WGS-84 reference ellipsoid.
    pub fn wgs84() -> Self {
        Self {
            semi_major_axis: 6_378_137.0,
            flattening: 1.0 / 298.257_223_563,
        }
    }

    /// Semi-major axis in meters.
    #[inline(always)]
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Flattening.
    #[inline(always)]
    pub fn flattening(&self) -> f64 {
        self.flattening
    }

    /// Semi-minor axis in meters.
    #[inline(always)]
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.flattening)
    }

    /// Square of the first eccentricity.
    #[inline(always)]
    fn first_eccentricity_sq(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Square of the second eccentricity.
    #[inline(always)]
    fn second_eccentricity_sq(&self) -> f64 {
        let e2 = self.first_eccentricity_sq();
        e2 / (1.0 - e2)
    }

    /// Prime vertical radius of curvature at geodetic latitude `lat` (radians).
    #[inline(always)]
    fn prime_vertical_radius(&self, sin_lat: f64) -> f64 {
        self.semi_major_axis / (1.0 - self.first_eccentricity_sq() * sin_lat * sin_lat).sqrt()
    }

    /// Projects geodetic coordinates (degrees, degrees, meters) into the
    /// Cartesian embedding.
    ///
    /// Longitude is normalized to `[-180, 180)` first, so inputs differing
    /// by full turns project identically.
    pub fn project(&self, longitude_deg: f64, latitude_deg: f64, altitude_m: f64) -> [f64; 3] {
        let lon = normalize_longitude(longitude_deg).to_radians();
        let lat = latitude_deg.to_radians();

        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        let n = self.prime_vertical_radius(sin_lat);

        [
            (n + altitude_m) * cos_lat * cos_lon,
            (n + altitude_m) * cos_lat * sin_lon,
            (n * (1.0 - self.first_eccentricity_sq()) + altitude_m) * sin_lat,
        ]
    }

    /// Recovers geodetic coordinates (degrees, degrees, meters) from a point
    /// of the Cartesian embedding.
    pub fn unproject(&self, point: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = point;
        let a = self.semi_major_axis;
        let b = self.semi_minor_axis();
        let e2 = self.first_eccentricity_sq();
        let ep2 = self.second_eccentricity_sq();

        let p = x.hypot(y);

        if p < 1e-9 {
            // On the polar axis the longitude is degenerate.
            let lat = if z >= 0.0 { 90.0 } else { -90.0 };
            return (0.0, lat, z.abs() - b);
        }

        let lon = y.atan2(x);

        // Bowring's parametric latitude seed and closed-form correction.
        let psi = (z * a).atan2(p * b);
        let (sin_psi, cos_psi) = psi.sin_cos();
        let lat = (z + ep2 * b * sin_psi.powi(3)).atan2(p - e2 * a * cos_psi.powi(3));

        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = self.prime_vertical_radius(sin_lat);

        // Near the poles cos(lat) vanishes; recover the altitude from the
        // polar component instead.
        let alt = if cos_lat.abs() > 1e-9 {
            p / cos_lat - n
        } else {
            z / sin_lat - n * (1.0 - e2)
        };

        (lon.to_degrees(), lat.to_degrees(), alt)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}

/// Normalizes a longitude in degrees to `[-180, 180)`.
#[inline(always)]
pub(crate) fn normalize_longitude(longitude_deg: f64) -> f64 {
    let wrapped = (longitude_deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can return the modulus itself when rounding up.
    if wrapped >= 180.0 { -180.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "expected {} ~ {} (tol {})", a, b, tol);
    }

    #[test]
    fn wgs84_constants() {
        let wgs84 = Ellipsoid::wgs84();
        assert_eq!(wgs84.semi_major_axis(), 6_378_137.0);
        assert_close(wgs84.semi_minor_axis(), 6_356_752.314_245, 1e-6);
    }

    #[test]
    fn equatorial_points_on_axes() {
        let wgs84 = Ellipsoid::wgs84();
        let a = wgs84.semi_major_axis();

        let p = wgs84.project(0.0, 0.0, 0.0);
        assert_close(p[0], a, 1e-9);
        assert_close(p[1], 0.0, 1e-9);
        assert_close(p[2], 0.0, 1e-9);

        let p = wgs84.project(90.0, 0.0, 0.0);
        assert_close(p[0], 0.0, 1e-6);
        assert_close(p[1], a, 1e-9);

        let p = wgs84.project(0.0, 90.0, 0.0);
        assert_close(p[2], wgs84.semi_minor_axis(), 1e-6);
    }

    #[test]
    fn altitude_shifts_along_the_normal() {
        let wgs84 = Ellipsoid::wgs84();
        let ground = wgs84.project(12.5, -33.0, 0.0);
        let raised = wgs84.project(12.5, -33.0, 1000.0);
        let shift = orbis_rtree_utils::get_distance(&ground, &raised);
        assert_close(shift, 1000.0, 1e-6);
    }

    #[test]
    fn round_trip_over_the_globe() {
        let wgs84 = Ellipsoid::wgs84();
        for lon in [-179.5, -120.0, -45.0, 0.0, 33.3, 90.0, 179.9] {
            for lat in [-89.9, -60.0, -15.5, 0.0, 12.0, 45.0, 89.9] {
                for alt in [-500.0, 0.0, 8848.0, 20_000.0] {
                    let (lon2, lat2, alt2) = wgs84.unproject(wgs84.project(lon, lat, alt));
                    assert_close(lon2, lon, 1e-9);
                    assert_close(lat2, lat, 1e-9);
                    assert_close(alt2, alt, 1e-6);
                }
            }
        }
    }

    #[test]
    fn round_trip_at_the_poles() {
        let wgs84 = Ellipsoid::wgs84();
        for (lat, alt) in [(90.0, 0.0), (-90.0, 150.0)] {
            let (_, lat2, alt2) = wgs84.unproject(wgs84.project(45.0, lat, alt));
            assert_close(lat2, lat, 1e-9);
            assert_close(alt2, alt, 1e-6);
        }
    }

    #[test]
    fn longitude_wraps_modulo_full_turns() {
        let wgs84 = Ellipsoid::wgs84();
        let reference = wgs84.project(10.0, 20.0, 0.0);
        for lon in [370.0, -350.0, 730.0] {
            let wrapped = wgs84.project(lon, 20.0, 0.0);
            for dim in 0..3 {
                assert_close(wrapped[dim], reference[dim], 1e-6);
            }
        }
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
    }

    #[test]
    fn spherical_ellipsoid_degenerates_to_radius() {
        let sphere = Ellipsoid::new(1000.0, 0.0);
        let p = sphere.project(77.0, -12.0, 0.0);
        assert_close(orbis_rtree_utils::get_distance(&p, &[0.0; 3]), 1000.0, 1e-9);
    }
}
