//! Parameters for normal and tangent computation.
//!
//! # Presets
//!
//! - [`NormalParams::vertex()`] - Smoothed normals, one per vertex
//! - [`NormalParams::uniform()`] - Flat normals, one per face
//! - [`NormalParams::face_varying()`] - Smoothed normals, one per facevertex
//! - [`Schedule::sequential()`] - Run every stage on the calling thread
//!
//! # Example
//!
//! ```
//! use mesh_shading::{Interpolation, NormalParams, Schedule, TangentParams};
//!
//! let params = NormalParams::uniform().with_schedule(Schedule::sequential());
//! assert_eq!(params.interpolation, Interpolation::Uniform);
//!
//! let params = TangentParams::default()
//!     .with_uv_set("uv")
//!     .with_ortho_tangents(false);
//! assert_eq!(params.uv_set.u_name(), "uv_s");
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attributes::UvSet;

/// Default chunk length for parallel index ranges.
pub const DEFAULT_MIN_CHUNK_LEN: usize = 1024;

/// Name of the position attribute looked up by the named entry points.
pub const DEFAULT_POSITION_NAME: &str = "P";

/// How work is split across threads.
///
/// The chunk length only affects performance: offsets, counts and the
/// aggregated results are the same for every setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    /// Whether to use parallel processing (via rayon).
    pub parallel: bool,

    /// Minimum number of indices handed to one rayon task.
    pub min_chunk_len: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            parallel: true,
            min_chunk_len: DEFAULT_MIN_CHUNK_LEN,
        }
    }
}

impl Schedule {
    /// Parallel schedule with the default chunk length.
    #[must_use]
    pub fn parallel() -> Self {
        Self::default()
    }

    /// Run every stage on the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Set the minimum chunk length. Zero is clamped to one.
    #[must_use]
    pub const fn with_min_chunk_len(mut self, len: usize) -> Self {
        self.min_chunk_len = if len == 0 { 1 } else { len };
        self
    }

    /// Chunk length, never zero.
    #[inline]
    #[must_use]
    pub fn chunk_len(&self) -> usize {
        self.min_chunk_len.max(1)
    }
}

/// Which domain computed normals are defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    /// One normal per vertex, averaged over adjacent faces.
    #[default]
    Vertex,

    /// One normal per face; no aggregation.
    Uniform,

    /// One normal per facevertex: vertex normals re-expanded through the
    /// vertex ids, so shared vertices still share a normal.
    FaceVarying,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Uniform => write!(f, "uniform"),
            Self::FaceVarying => write!(f, "facevarying"),
        }
    }
}

/// What to do when a UV set has no companion index array.
///
/// The index array decides which facevertices share one tangent frame.
/// Falling back to vertex ids makes every facevertex on a vertex share a
/// frame even across UV seams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexFallback {
    /// Use the mesh vertex ids as UV connectivity.
    #[default]
    VertexIds,

    /// Fail with [`ShadingError::MissingAttribute`](crate::ShadingError::MissingAttribute).
    Error,
}

/// Parameters for normal computation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalParams {
    /// Output domain. Default: [`Interpolation::Vertex`]
    pub interpolation: Interpolation,

    /// Name of the position attribute. Default: `"P"`
    pub position: String,

    /// Work splitting.
    pub schedule: Schedule,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Vertex,
            position: DEFAULT_POSITION_NAME.to_string(),
            schedule: Schedule::default(),
        }
    }
}

impl NormalParams {
    /// Smoothed per-vertex normals.
    #[must_use]
    pub fn vertex() -> Self {
        Self::default()
    }

    /// Flat per-face normals.
    #[must_use]
    pub fn uniform() -> Self {
        Self::default().with_interpolation(Interpolation::Uniform)
    }

    /// Smoothed normals expanded to one per facevertex.
    #[must_use]
    pub fn face_varying() -> Self {
        Self::default().with_interpolation(Interpolation::FaceVarying)
    }

    /// Set the output domain.
    #[must_use]
    pub const fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the position attribute name.
    #[must_use]
    pub fn with_position(mut self, name: impl Into<String>) -> Self {
        self.position = name.into();
        self
    }

    /// Set the work schedule.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// Parameters for tangent frame computation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TangentParams {
    /// UV set supplying coordinates and connectivity. Default: `"st"`
    pub uv_set: UvSet,

    /// Name of the position attribute. Default: `"P"`
    pub position: String,

    /// Also make the bitangent orthogonal to the tangent. Default: true
    pub ortho_tangents: bool,

    /// Connectivity used when the UV set has no index array.
    /// Default: [`IndexFallback::VertexIds`]
    pub index_fallback: IndexFallback,

    /// Work splitting.
    pub schedule: Schedule,
}

impl Default for TangentParams {
    fn default() -> Self {
        Self {
            uv_set: UvSet::default(),
            position: DEFAULT_POSITION_NAME.to_string(),
            ortho_tangents: true,
            index_fallback: IndexFallback::default(),
            schedule: Schedule::default(),
        }
    }
}

impl TangentParams {
    /// Set the UV set name.
    #[must_use]
    pub fn with_uv_set(mut self, name: impl Into<String>) -> Self {
        self.uv_set = UvSet::new(name);
        self
    }

    /// Set the position attribute name.
    #[must_use]
    pub fn with_position(mut self, name: impl Into<String>) -> Self {
        self.position = name.into();
        self
    }

    /// Enable or disable tangent/bitangent orthogonalization.
    #[must_use]
    pub const fn with_ortho_tangents(mut self, ortho: bool) -> Self {
        self.ortho_tangents = ortho;
        self
    }

    /// Set the missing index array policy.
    #[must_use]
    pub const fn with_index_fallback(mut self, fallback: IndexFallback) -> Self {
        self.index_fallback = fallback;
        self
    }

    /// Set the work schedule.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}
