/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for the geodetic spatial index.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Geodetic R-tree spatial index with local interpolation.
//!
//! Scattered observations, scalar values attached to longitude/latitude
//! (and optionally altitude plus further Euclidean axes), are projected
//! onto the Cartesian embedding of a reference ellipsoid and organised in a
//! balanced R-tree. Arbitrary positions can then be queried for their
//! nearest neighbours or interpolated locally:
//!
//! - **k-NN queries** with an optional `within` constraint that rejects
//!   positions their neighbours do not surround (no extrapolation).
//! - **Inverse distance weighting (IDW)** over the k nearest neighbours.
//! - **Radial basis functions (RBF)**, solving a small dense kernel system
//!   per position with a selectable kernel family.
//!
//! Query batches fan out over worker threads; results are deterministic
//! regardless of thread count. Index state round-trips through an opaque
//! versioned snapshot blob.
//!
//! Built on [`faer`](https://docs.rs/faer/latest/faer/) for the dense RBF
//! solves, avoiding complex build dependencies.
//!
//! # Features
//! - One generic implementation covering `f32`/`f64` storage and any
//!   dimension count from 3 upward
//! - Bulk "packing" construction for static datasets, incremental
//!   insertion for growing ones
//! - Exact nearest-neighbour search (best-first traversal, distances in
//!   meters for Earth-like ellipsoids)
//! - Parallel query batches with order-preserving, reproducible output
//!
//! # Examples
//!
//! ```
//! use faer::Mat;
//! use orbis_rtree::{Ellipsoid, GeodeticIndex3F64, IdwSettings, QuerySettings};
//!
//! // Scalar observations at three geodetic positions (degrees).
//! let coordinates = Mat::<f64>::from_fn(3, 2, |row, col| match (row, col) {
//!     (1, 0) => 1.0,
//!     (2, 1) => 1.0,
//!     _ => 0.0,
//! });
//! let values = [10.0, 20.0, 30.0];
//!
//! let mut index = GeodeticIndex3F64::new(Ellipsoid::wgs84());
//! index.packing(coordinates.as_ref(), &values)?;
//!
//! // The nearest observation to a position between them.
//! let query = Mat::<f64>::from_fn(1, 2, |_, _| 0.1);
//! let settings = QuerySettings::builder().k(1).within(false).build();
//! let (_distances, found) = index.query(query.as_ref(), &settings)?;
//! assert_eq!(*found.get(0, 0), 10.0);
//!
//! // Interpolating exactly at an observation reproduces its value.
//! let at_origin = Mat::<f64>::zeros(1, 2);
//! let (estimates, counts) =
//!     index.inverse_distance_weighting(at_origin.as_ref(), &IdwSettings::default())?;
//! assert_eq!(estimates[0], 10.0);
//! assert_eq!(counts[0], 1);
//! # Ok::<(), orbis_rtree::IndexError>(())
//! ```
//!
//! # References
//! 1. A. Guttman. R-trees: a dynamic index structure for spatial searching.
//!    SIGMOD 1984.
//! 2. S. T. Leutenegger, M. A. Lopez, J. Edgington. STR: a simple and
//!    efficient algorithm for R-tree packing. ICDE 1997.
//! 3. G. R. Hjaltason, H. Samet. Distance browsing in spatial databases.
//!    ACM TODS 24(2), 1999.
//! 4. B. R. Bowring. Transformation from spatial to geographical
//!    coordinates. Survey Review 23(181), 1976.

pub mod config;

mod ellipsoid;

mod point_store;

mod rtree;

mod query;

mod idw;

mod rbf;

mod linalg;

mod index;

mod snapshot;

pub mod progress;

pub use {
    config::{
        IdwSettings, IdwSettingsBuilder, QuerySettings, QuerySettingsBuilder, RbfKernel,
        RbfSettings, RbfSettingsBuilder,
    },
    ellipsoid::Ellipsoid,
    index::{
        GeodeticIndex, GeodeticIndex3F32, GeodeticIndex3F64, GeodeticIndex4F32, GeodeticIndex4F64,
        GeodeticIndexBuilder, IndexError,
    },
    snapshot::SnapshotError,
};
