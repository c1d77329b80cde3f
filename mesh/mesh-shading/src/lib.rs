//! Parallel per-vertex normals and tangent frames for polygon meshes.
//!
//! This crate computes smoothed normals and UV tangent frames from raw face
//! topology (a vertex count per face and a flat array of vertex ids). The
//! vertex-to-face adjacency it needs is built without hash maps: atomic
//! counters count references per vertex, a parallel prefix sum turns the
//! counts into offsets, and a second atomic pass scatters face indices into
//! a compressed sparse row layout.
//!
//! # Features
//!
//! - **Vertex normals**: Area-independent average of adjacent face normals
//! - **Uniform normals**: One normal per face
//! - **Facevarying normals**: Vertex normals expanded per facevertex
//! - **Tangent frames**: Right-handed tangent and bitangent per facevertex,
//!   shared by unique UV index so seams stay sharp
//! - **Named attributes**: Look inputs up by name through
//!   [`PrimitiveVariables`]
//! - **Stage timings**: Optional per-stage reporting via [`StageObserver`]
//!
//! Results do not depend on the number of worker threads beyond
//! floating-point summation order.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_shading::{
//!     compute_normals, compute_tangents, Connectivity, FaceTopology, Interpolation,
//!     UvCoordinates,
//! };
//! use nalgebra::Vector3;
//!
//! let positions = vec![
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 0.0, 0.0),
//!     Vector3::new(1.0, 1.0, 0.0),
//!     Vector3::new(0.0, 1.0, 0.0),
//! ];
//! let vert_ids = [0, 1, 2, 0, 2, 3];
//! let topology = FaceTopology::new(&[3, 3], &vert_ids).unwrap();
//!
//! let normals = compute_normals(&topology, &positions, Interpolation::Vertex).unwrap();
//! println!("Vertex normals: {normals:?}");
//!
//! let s = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0];
//! let t = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
//! let frames = compute_tangents(
//!     &topology,
//!     &positions,
//!     UvCoordinates::new(&s, &t),
//!     Connectivity::VertexIds,
//!     true,
//! )
//! .unwrap();
//! println!("Tangents: {:?}", frames.tangents);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Indices are validated against u32 counter range before use
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::many_single_char_names)]

mod adjacency;
mod aggregate;
mod attributes;
mod counters;
mod error;
mod exec;
mod face;
mod normals;
mod observer;
mod offsets;
mod params;
mod tangents;
mod topology;
mod vector;

pub use adjacency::{AdjacencyBuilder, FaceAdjacency};
pub use aggregate::{
    accumulate_basis, average_normal, average_normals, resolve_basis, resolve_tangent_frames,
};
pub use attributes::{AttributeMap, DEFAULT_UV_SET, PrimitiveVariables, UvSet};
pub use counters::AtomicCounters;
pub use error::{ShadingError, ShadingResult};
pub use face::{TangentBasis, face_bases, face_basis, face_normal, face_normals};
pub use normals::{compute_normals, compute_normals_from, compute_normals_with};
pub use observer::{NoopObserver, Stage, StageObserver, StageTiming, StageTimings};
pub use offsets::{ScanValue, exclusive_scan};
pub use params::{
    DEFAULT_MIN_CHUNK_LEN, DEFAULT_POSITION_NAME, IndexFallback, Interpolation, NormalParams,
    Schedule, TangentParams,
};
pub use tangents::{
    Connectivity, TangentFrames, UvCoordinates, compute_tangents, compute_tangents_from,
    compute_tangents_with,
};
pub use topology::FaceTopology;
pub use vector::GeometryVector;
