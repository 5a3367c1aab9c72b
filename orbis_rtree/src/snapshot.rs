/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the versioned snapshot codec for persisting and restoring index state.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # snapshot
//!
//! Serializes an index into an opaque, versioned byte blob and restores it.
//! The blob is a JSON envelope `{ format, version, ... }` carrying the
//! ellipsoid, the dimension count, the storage precision tag, the ordered
//! point store contents, and a flag recording that the tree is rebuilt by
//! packing on load. Packing is deterministic in id order and nearest
//! neighbour search is exact, so a restored index answers queries
//! identically to the instance that produced the blob.
//!
//! The envelope is validated before any instance is built: a malformed or
//! incompatible blob (wrong format, version, ndims or precision) is
//! rejected and leaves nothing half-initialized.

use crate::ellipsoid::Ellipsoid;
use crate::index::GeodeticIndex;
use crate::point_store::PointStore;
use crate::rtree::{RTree, TreeEntry};

use orbis_rtree_utils::SpatialScalar;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

const SNAPSHOT_FORMAT_NAME: &str = "orbis_rtree.snapshot";
const SNAPSHOT_VERSION: u32 = 1;

/// Borrowing envelope for encoding (no clone of the store).
#[derive(Serialize)]
struct SnapshotEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: &'a T,
}

/// Owning envelope for decoding.
#[derive(Serialize, Deserialize)]
struct SnapshotEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

/// The explicit payload schema: coordinates flattened row-major, values in
/// id order. Independent of the in-memory representation of the store and
/// the tree, so the format survives internal refactors.
#[derive(Serialize)]
struct SnapshotModelRef<'a, F: SpatialScalar> {
    ellipsoid: &'a Ellipsoid,
    ndims: usize,
    precision: &'static str,
    points: Vec<F>,
    values: Vec<F>,
    packed_tree: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct SnapshotModelOwned<F: SpatialScalar> {
    ellipsoid: Ellipsoid,
    ndims: usize,
    precision: String,
    points: Vec<F>,
    values: Vec<F>,
    packed_tree: bool,
}

type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Errors that can occur when encoding or decoding an index snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// Error serializing the index state.
    Serialize { source: serde_json::Error },

    /// Error parsing the snapshot blob.
    Parse { source: serde_json::Error },

    /// The `format` field does not match the expected snapshot format.
    FormatMismatch { found: String, expected: &'static str },

    /// The `version` field does not match the supported version.
    VersionMismatch { found: u32, expected: u32 },

    /// The snapshot was produced with a different dimension count.
    NdimsMismatch { found: usize, expected: usize },

    /// The snapshot was produced with a different storage precision.
    PrecisionMismatch { found: String, expected: &'static str },

    /// The payload arrays are inconsistent with the recorded shape.
    CorruptPayload {
        points: usize,
        values: usize,
        ndims: usize,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Serialize { source } => {
                write!(f, "serializing snapshot: {}", source)
            }
            SnapshotError::Parse { source } => {
                write!(f, "parsing snapshot: {}", source)
            }
            SnapshotError::FormatMismatch { found, expected } => {
                write!(f, "unsupported format {:?} (expected {:?})", found, expected)
            }
            SnapshotError::VersionMismatch { found, expected } => {
                write!(f, "unsupported version {} (expected {})", found, expected)
            }
            SnapshotError::NdimsMismatch { found, expected } => {
                write!(f, "snapshot has ndims {} (expected {})", found, expected)
            }
            SnapshotError::PrecisionMismatch { found, expected } => {
                write!(
                    f,
                    "snapshot has precision {:?} (expected {:?})",
                    found, expected
                )
            }
            SnapshotError::CorruptPayload {
                points,
                values,
                ndims,
            } => write!(
                f,
                "snapshot payload has {} coordinates for {} values of {} dimensions",
                points, values, ndims
            ),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SnapshotError::Serialize { source } | SnapshotError::Parse { source } => Some(source),
            _ => None,
        }
    }
}

impl<F: SpatialScalar, const N: usize> GeodeticIndex<F, N> {
    /// Encodes the index state into an opaque, versioned byte blob.
    ///
    /// The progress callback is not part of the snapshot.
    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        let mut points = Vec::with_capacity(self.store.len() * N);
        let mut values = Vec::with_capacity(self.store.len());
        for (_, point, value) in self.store.iter() {
            points.extend_from_slice(point);
            values.push(value);
        }

        let model = SnapshotModelRef {
            ellipsoid: &self.ellipsoid,
            ndims: N,
            precision: F::PRECISION,
            points,
            values,
            packed_tree: true,
        };

        let envelope = SnapshotEnvelopeRef {
            format: SNAPSHOT_FORMAT_NAME,
            version: SNAPSHOT_VERSION,
            model: &model,
        };

        serde_json::to_vec(&envelope).map_err(|e| SnapshotError::Serialize { source: e })
    }

    /// Restores an index from a blob produced by [`to_bytes`](Self::to_bytes),
    /// validating format, version, dimension count and precision first.
    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        let envelope: SnapshotEnvelopeOwned<SnapshotModelOwned<F>> =
            serde_json::from_slice(bytes).map_err(|e| SnapshotError::Parse { source: e })?;

        if envelope.format != SNAPSHOT_FORMAT_NAME {
            return Err(SnapshotError::FormatMismatch {
                found: envelope.format,
                expected: SNAPSHOT_FORMAT_NAME,
            });
        }
        if envelope.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: envelope.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let model = envelope.model;
        if model.ndims != N {
            return Err(SnapshotError::NdimsMismatch {
                found: model.ndims,
                expected: N,
            });
        }
        if model.precision != F::PRECISION {
            return Err(SnapshotError::PrecisionMismatch {
                found: model.precision,
                expected: F::PRECISION,
            });
        }
        if model.points.len() != model.values.len() * N {
            return Err(SnapshotError::CorruptPayload {
                points: model.points.len(),
                values: model.values.len(),
                ndims: N,
            });
        }

        let mut store = PointStore::new();
        let mut entries = Vec::with_capacity(model.values.len());
        for (row, value) in model.points.chunks_exact(N).zip(model.values.iter()) {
            let point: [F; N] = std::array::from_fn(|dim| row[dim]);
            let id = store.append(point, *value);
            entries.push(TreeEntry {
                point: std::array::from_fn(|dim| point[dim].to_f64()),
                id,
            });
        }

        let mut tree = RTree::new();
        tree.bulk_load(entries);

        Ok(GeodeticIndex {
            ellipsoid: model.ellipsoid,
            store,
            tree,
            progress_callback: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuerySettings;
    use crate::index::{GeodeticIndex3F32, GeodeticIndex3F64};
    use faer::Mat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn populated_index(seed: u64) -> GeodeticIndex3F64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let coordinates = Mat::<f64>::from_fn(150, 3, |_, col| match col {
            0 => rng.random_range(-180.0..180.0),
            1 => rng.random_range(-85.0..85.0),
            _ => rng.random_range(0.0..500.0),
        });
        let values: Vec<f64> = (0..150).map(|i| (i as f64).cos()).collect();

        let mut index = GeodeticIndex3F64::new(Ellipsoid::wgs84());
        index.packing(coordinates.as_ref(), &values).unwrap();
        index
    }

    #[test]
    fn round_trip_reproduces_query_results() {
        let index = populated_index(4);
        let blob = index.to_bytes().unwrap();
        let restored = GeodeticIndex3F64::from_bytes(&blob).unwrap();

        assert_eq!(index.len(), restored.len());
        assert_eq!(index.ellipsoid(), restored.ellipsoid());

        let mut rng = StdRng::seed_from_u64(5);
        let queries = Mat::<f64>::from_fn(25, 2, |_, col| match col {
            0 => rng.random_range(-180.0..180.0),
            _ => rng.random_range(-85.0..85.0),
        });

        let settings = QuerySettings::builder().k(6).within(false).build();
        let (d0, v0) = index.query(queries.as_ref(), &settings).unwrap();
        let (d1, v1) = restored.query(queries.as_ref(), &settings).unwrap();

        for row in 0..25 {
            for col in 0..6 {
                assert_eq!(d0.get(row, col), d1.get(row, col));
                assert_eq!(v0.get(row, col), v1.get(row, col));
            }
        }
    }

    #[test]
    fn empty_index_round_trips() {
        let index = GeodeticIndex3F64::new(Ellipsoid::wgs84());
        let blob = index.to_bytes().unwrap();
        let restored = GeodeticIndex3F64::from_bytes(&blob).unwrap();
        assert!(restored.is_empty());
        assert!(restored.bounds().is_none());
    }

    #[test]
    fn garbage_is_rejected_as_parse_error() {
        let err = GeodeticIndex3F64::from_bytes(b"not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
    }

    #[test]
    fn format_and_version_are_validated() {
        let index = populated_index(6);
        let blob = index.to_bytes().unwrap();
        let text = String::from_utf8(blob).unwrap();

        let wrong_format = text.replacen("orbis_rtree.snapshot", "something.else", 1);
        assert!(matches!(
            GeodeticIndex3F64::from_bytes(wrong_format.as_bytes()).unwrap_err(),
            SnapshotError::FormatMismatch { .. }
        ));

        let wrong_version = text.replacen("\"version\":1", "\"version\":99", 1);
        assert!(matches!(
            GeodeticIndex3F64::from_bytes(wrong_version.as_bytes()).unwrap_err(),
            SnapshotError::VersionMismatch { found: 99, .. }
        ));
    }

    #[test]
    fn precision_mismatch_is_rejected() {
        let index = populated_index(7);
        let blob = index.to_bytes().unwrap();
        let err = GeodeticIndex3F32::from_bytes(&blob).unwrap_err();
        assert!(matches!(err, SnapshotError::PrecisionMismatch { .. }));
    }

    #[test]
    fn ndims_mismatch_is_rejected() {
        use crate::index::GeodeticIndex4F64;

        let index = populated_index(8);
        let blob = index.to_bytes().unwrap();
        let err = GeodeticIndex4F64::from_bytes(&blob).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::NdimsMismatch {
                found: 3,
                expected: 4
            }
        ));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let index = populated_index(9);
        let text = String::from_utf8(index.to_bytes().unwrap()).unwrap();

        // Claim one value too many relative to the coordinate array.
        let corrupted = text.replacen("\"values\":[", "\"values\":[0.0,", 1);
        let err = GeodeticIndex3F64::from_bytes(corrupted.as_bytes()).unwrap_err();
        assert!(matches!(err, SnapshotError::CorruptPayload { .. }));
    }
}
