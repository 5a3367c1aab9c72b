/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the geodetic spatial index facade: construction, queries, and interpolation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    config::{IdwSettings, QuerySettings, RbfSettings},
    ellipsoid::Ellipsoid,
    idw::idw_estimate,
    point_store::PointStore,
    progress::{ProgressMsg, ProgressSink},
    query::{collect_neighbours, run_batch},
    rbf::rbf_estimate,
    rtree::{RTree, TreeEntry},
};

use faer::{Mat, MatRef};
use orbis_rtree_utils::SpatialScalar;
use std::{error::Error, fmt, sync::Arc};

/// Errors rejected synchronously by index construction and query operations.
///
/// Shape errors are detected before any mutation, so a failed call leaves
/// the index untouched; parameter errors are detected before any
/// computation starts.
#[derive(Debug, PartialEq)]
pub enum IndexError {
    /// The coordinate matrix must have `ndims` or `ndims - 1` columns.
    CoordinateShape { found: usize, ndims: usize },

    /// The value array length differs from the number of coordinate rows.
    ValueLength { rows: usize, values: usize },

    /// A positive neighbour count is required for interpolation.
    InvalidNeighbourCount { k: usize },

    /// The inverse distance power must be a positive integer.
    InvalidPower { p: u32 },

    /// The smoothing term must be finite and non-negative.
    InvalidSmoothing { smooth: f64 },

    /// Epsilon was supplied for a kernel without a shape parameter.
    EpsilonNotAdjustable { kernel: crate::config::RbfKernel },

    /// Epsilon must be finite and positive when supplied.
    InvalidEpsilon { epsilon: f64 },

    /// The search radius must be finite and positive when supplied.
    InvalidRadius { radius: f64 },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::CoordinateShape { found, ndims } => write!(
                f,
                "coordinate matrix has {} columns, expected {} or {}",
                found,
                ndims,
                ndims - 1
            ),
            IndexError::ValueLength { rows, values } => write!(
                f,
                "value array has {} elements for {} coordinate rows",
                values, rows
            ),
            IndexError::InvalidNeighbourCount { k } => {
                write!(f, "neighbour count must be positive, got {}", k)
            }
            IndexError::InvalidPower { p } => {
                write!(f, "inverse distance power must be positive, got {}", p)
            }
            IndexError::InvalidSmoothing { smooth } => {
                write!(f, "smoothing must be finite and non-negative, got {}", smooth)
            }
            IndexError::EpsilonNotAdjustable { kernel } => {
                write!(f, "epsilon is not accepted by the {:?} kernel", kernel)
            }
            IndexError::InvalidEpsilon { epsilon } => {
                write!(f, "epsilon must be finite and positive, got {}", epsilon)
            }
            IndexError::InvalidRadius { radius } => {
                write!(f, "radius must be finite and positive, got {}", radius)
            }
        }
    }
}

impl Error for IndexError {}

/// Convenience builder for constructing a [`GeodeticIndex`].
///
/// The builder should be called via the [`GeodeticIndex::builder`] method.
pub struct GeodeticIndexBuilder<F: SpatialScalar, const N: usize> {
    ellipsoid: Ellipsoid,
    progress_callback: Option<Arc<dyn ProgressSink>>,
    _precision: std::marker::PhantomData<F>,
}

impl<F: SpatialScalar, const N: usize> GeodeticIndexBuilder<F, N> {
    fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            progress_callback: None,
            _precision: std::marker::PhantomData,
        }
    }

    /// Optional callback for reporting construction and batch progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Builds and returns the configured, empty [`GeodeticIndex`].
    pub fn build(self) -> GeodeticIndex<F, N> {
        GeodeticIndex {
            ellipsoid: self.ellipsoid,
            store: PointStore::new(),
            tree: RTree::new(),
            progress_callback: self.progress_callback,
        }
    }
}

/// Spatial index for scalar values observed at geodetic positions.
///
/// Observations are projected onto the Cartesian embedding of the bound
/// [`Ellipsoid`] and organised in a balanced R-tree; queries look up
/// nearest neighbours or interpolate (inverse distance weighting, radial
/// basis functions) at arbitrary positions. Distances are Euclidean in the
/// embedding and therefore meters for Earth-like ellipsoids.
///
/// The type is generic over the storage precision `F` (`f32`/`f64`) and
/// the dimension count `N >= 3`: dimensions 0–2 derive from longitude,
/// latitude and altitude, further dimensions are plain Euclidean axes.
/// Construction takes `&mut self` and queries take `&self`, so the borrow
/// checker enforces the single-writer/many-reader discipline; query
/// batches may fan out over worker threads internally.
#[derive(Debug)]
pub struct GeodeticIndex<F: SpatialScalar, const N: usize> {
    pub(crate) ellipsoid: Ellipsoid,
    pub(crate) store: PointStore<F, N>,
    pub(crate) tree: RTree<N>,

    /// Optional callback for reporting progress.
    /// Skipped by the snapshot codec.
    pub(crate) progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl<F: SpatialScalar, const N: usize> GeodeticIndex<F, N> {
    /// Creates a new [`GeodeticIndexBuilder`] for the given ellipsoid.
    pub fn builder(ellipsoid: Ellipsoid) -> GeodeticIndexBuilder<F, N> {
        assert!(N >= 3, "the index needs at least the three ECEF dimensions");
        GeodeticIndexBuilder::new(ellipsoid)
    }

    /// Creates an empty index bound to the given ellipsoid.
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self::builder(ellipsoid).build()
    }

    /// The ellipsoid the index projects through.
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Number of stored observations.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when the index holds no observations.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes all observations, keeping the ellipsoid, precision and
    /// dimension count fixed. Ids restart at zero afterwards.
    pub fn clear(&mut self) {
        self.store.clear();
        self.tree.clear();
    }

    /// The minimum and maximum corners of the box containing every stored
    /// observation, or `None` when the index is empty.
    pub fn bounds(&self) -> Option<([F; N], [F; N])> {
        self.tree.bounds().map(|(min, max)| {
            (
                std::array::from_fn(|dim| F::from_f64(min[dim])),
                std::array::from_fn(|dim| F::from_f64(max[dim])),
            )
        })
    }

    /// Validates a coordinate/value pair and projects every row into the
    /// Cartesian embedding. Rejects before any state is touched.
    fn project_coordinates(
        &self,
        coordinates: MatRef<'_, F>,
        values: Option<&[F]>,
    ) -> Result<Vec<[f64; N]>, IndexError> {
        let rows = coordinates.nrows();
        let cols = coordinates.ncols();

        if cols != N && cols != N - 1 {
            return Err(IndexError::CoordinateShape {
                found: cols,
                ndims: N,
            });
        }
        if let Some(values) = values {
            if values.len() != rows {
                return Err(IndexError::ValueLength {
                    rows,
                    values: values.len(),
                });
            }
        }

        let has_altitude = cols == N;
        let extra_start = if has_altitude { 3 } else { 2 };

        let mut points = Vec::with_capacity(rows);
        for row in 0..rows {
            let longitude = coordinates.get(row, 0).to_f64();
            let latitude = coordinates.get(row, 1).to_f64();
            let altitude = match has_altitude {
                true => coordinates.get(row, 2).to_f64(),
                false => 0.0,
            };

            let ecef = self.ellipsoid.project(longitude, latitude, altitude);

            let mut point = [0.0f64; N];
            point[..3].copy_from_slice(&ecef);
            for (offset, col) in (extra_start..cols).enumerate() {
                point[3 + offset] = coordinates.get(row, col).to_f64();
            }
            points.push(point);
        }

        Ok(points)
    }

    /// The stored point under `id`, in the f64 computation domain.
    fn stored_point(&self, id: usize) -> [f64; N] {
        let point = self.store.point(id);
        std::array::from_fn(|dim| point[dim].to_f64())
    }

    fn emit(&self, msg: ProgressMsg) {
        if let Some(sink) = &self.progress_callback {
            sink.emit(msg);
        }
    }

    /// Bulk-loads the index with a packing algorithm, discarding any
    /// existing observations first.
    ///
    /// `coordinates` is an `(n, ndims)` matrix of longitude (degrees),
    /// latitude (degrees), altitude (meters) and any further Euclidean
    /// axes; with `ndims - 1` columns the altitude is taken as zero for
    /// every row. Packing yields tighter boxes and better query locality
    /// than repeated [`insert`](Self::insert), and is preferred for static
    /// datasets.
    pub fn packing(
        &mut self,
        coordinates: MatRef<'_, F>,
        values: &[F],
    ) -> Result<(), IndexError> {
        let points = self.project_coordinates(coordinates, Some(values))?;

        self.store.clear();
        let entries = points
            .iter()
            .zip(values.iter())
            .map(|(point, value)| {
                // The tree indexes the coordinates as stored, so the f32
                // instantiation rounds before either structure sees them.
                let stored: [F; N] = std::array::from_fn(|dim| F::from_f64(point[dim]));
                let id = self.store.append(stored, *value);
                TreeEntry {
                    point: std::array::from_fn(|dim| stored[dim].to_f64()),
                    id,
                }
            })
            .collect();
        self.tree.bulk_load(entries);

        self.emit(ProgressMsg::TreePacked {
            num_points: self.store.len(),
        });
        Ok(())
    }

    /// Inserts new observations without discarding existing ones.
    ///
    /// Accepts the same coordinate layout as [`packing`](Self::packing).
    pub fn insert(&mut self, coordinates: MatRef<'_, F>, values: &[F]) -> Result<(), IndexError> {
        let points = self.project_coordinates(coordinates, Some(values))?;

        for (point, value) in points.iter().zip(values.iter()) {
            let stored: [F; N] = std::array::from_fn(|dim| F::from_f64(point[dim]));
            let id = self.store.append(stored, *value);
            self.tree.insert(TreeEntry {
                point: std::array::from_fn(|dim| stored[dim].to_f64()),
                id,
            });
        }

        self.emit(ProgressMsg::PointsInserted {
            num_points: points.len(),
        });
        Ok(())
    }

    /// Searches the k nearest neighbours of every provided position.
    ///
    /// Returns `(distances, values)` matrices of shape `(n, k)`; positions
    /// with fewer than `k` neighbours (or rejected by the `within`
    /// constraint) fill the missing slots with an infinite distance and a
    /// NaN value.
    pub fn query(
        &self,
        coordinates: MatRef<'_, F>,
        settings: &QuerySettings,
    ) -> Result<(Mat<F>, Mat<F>), IndexError> {
        let positions = self.project_coordinates(coordinates, None)?;

        let results = run_batch(&positions, settings.num_threads, |position| {
            collect_neighbours(
                &self.tree,
                |id| self.stored_point(id),
                position,
                settings.k,
                None,
                settings.within,
            )
        });

        let distances = Mat::from_fn(positions.len(), settings.k, |row, col| {
            results[row]
                .get(col)
                .map(|neighbour| F::from_f64(neighbour.distance))
                .unwrap_or_else(F::infinity)
        });
        let values = Mat::from_fn(positions.len(), settings.k, |row, col| {
            results[row]
                .get(col)
                .map(|neighbour| self.store.value(neighbour.id))
                .unwrap_or_else(F::nan)
        });

        self.emit(ProgressMsg::BatchCompleted {
            num_positions: positions.len(),
        });
        Ok((distances, values))
    }

    /// Interpolates the value at every provided position by inverse
    /// distance weighting of its k nearest neighbours.
    ///
    /// Returns the estimates and the number of neighbours each one used; a
    /// position with no usable neighbours reports NaN with a count of zero.
    pub fn inverse_distance_weighting(
        &self,
        coordinates: MatRef<'_, F>,
        settings: &IdwSettings,
    ) -> Result<(Vec<F>, Vec<usize>), IndexError> {
        validate_idw(settings)?;
        let positions = self.project_coordinates(coordinates, None)?;

        let results = run_batch(&positions, settings.num_threads, |position| {
            let neighbours = collect_neighbours(
                &self.tree,
                |id| self.stored_point(id),
                position,
                settings.k,
                settings.radius,
                settings.within,
            );
            let pairs: Vec<(f64, f64)> = neighbours
                .iter()
                .map(|neighbour| (neighbour.distance, self.store.value(neighbour.id).to_f64()))
                .collect();
            idw_estimate(&pairs, settings.p)
        });

        self.emit(ProgressMsg::BatchCompleted {
            num_positions: positions.len(),
        });
        Ok(split_estimates(results))
    }

    /// Interpolates the value at every provided position by radial basis
    /// functions over its k nearest neighbours.
    ///
    /// Each position solves its own local kernel system; a singular or
    /// ill-conditioned system yields NaN for that position only and never
    /// aborts the batch.
    pub fn radial_basis_function(
        &self,
        coordinates: MatRef<'_, F>,
        settings: &RbfSettings,
    ) -> Result<(Vec<F>, Vec<usize>), IndexError> {
        validate_rbf(settings)?;
        let positions = self.project_coordinates(coordinates, None)?;
        let kernel_type = settings.kernel.into();

        let results = run_batch(&positions, settings.num_threads, |position| {
            let neighbours = collect_neighbours(
                &self.tree,
                |id| self.stored_point(id),
                position,
                settings.k,
                settings.radius,
                settings.within,
            );
            let points: Vec<[f64; N]> = neighbours
                .iter()
                .map(|neighbour| self.stored_point(neighbour.id))
                .collect();
            let values: Vec<f64> = neighbours
                .iter()
                .map(|neighbour| self.store.value(neighbour.id).to_f64())
                .collect();
            rbf_estimate(
                position,
                &points,
                &values,
                kernel_type,
                settings.epsilon,
                settings.smooth,
            )
        });

        self.emit(ProgressMsg::BatchCompleted {
            num_positions: positions.len(),
        });
        Ok(split_estimates(results))
    }
}

fn split_estimates<F: SpatialScalar>(results: Vec<(f64, usize)>) -> (Vec<F>, Vec<usize>) {
    let estimates = results
        .iter()
        .map(|(estimate, _)| F::from_f64(*estimate))
        .collect();
    let counts = results.into_iter().map(|(_, count)| count).collect();
    (estimates, counts)
}

fn validate_idw(settings: &IdwSettings) -> Result<(), IndexError> {
    if settings.k == 0 {
        return Err(IndexError::InvalidNeighbourCount { k: settings.k });
    }
    if settings.p == 0 {
        return Err(IndexError::InvalidPower { p: settings.p });
    }
    validate_radius(settings.radius)
}

fn validate_rbf(settings: &RbfSettings) -> Result<(), IndexError> {
    if settings.k == 0 {
        return Err(IndexError::InvalidNeighbourCount { k: settings.k });
    }
    if !settings.smooth.is_finite() || settings.smooth < 0.0 {
        return Err(IndexError::InvalidSmoothing {
            smooth: settings.smooth,
        });
    }
    if let Some(epsilon) = settings.epsilon {
        if !settings.kernel.is_adjustable() {
            return Err(IndexError::EpsilonNotAdjustable {
                kernel: settings.kernel,
            });
        }
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(IndexError::InvalidEpsilon { epsilon });
        }
    }
    validate_radius(settings.radius)
}

fn validate_radius(radius: Option<f64>) -> Result<(), IndexError> {
    match radius {
        Some(radius) if !radius.is_finite() || radius <= 0.0 => {
            Err(IndexError::InvalidRadius { radius })
        }
        _ => Ok(()),
    }
}

/// 3-D double precision index (longitude, latitude, altitude).
pub type GeodeticIndex3F64 = GeodeticIndex<f64, 3>;
/// 3-D single precision index.
pub type GeodeticIndex3F32 = GeodeticIndex<f32, 3>;
/// 4-D double precision index (one extra Euclidean axis).
pub type GeodeticIndex4F64 = GeodeticIndex<f64, 4>;
/// 4-D single precision index.
pub type GeodeticIndex4F32 = GeodeticIndex<f32, 4>;
