//! Tangent frames from triangle topology and UV coordinates.
//!
//! Facevertices that share a unique UV index share one tangent frame. The
//! frame of a unique index is built from the summed bases of every face
//! touching it, so seams in the UV layout (different indices on the same
//! vertex) keep separate frames.

use std::time::Instant;

use tracing::{Level, debug, info};

use crate::adjacency::AdjacencyBuilder;
use crate::aggregate::resolve_tangent_frames;
use crate::attributes::PrimitiveVariables;
use crate::error::{ShadingError, ShadingResult};
use crate::exec;
use crate::face::face_bases;
use crate::observer::{NoopObserver, Stage, StageObserver};
use crate::params::{IndexFallback, TangentParams};
use crate::topology::FaceTopology;
use crate::vector::GeometryVector;

/// Per-facevertex u and v coordinates.
#[derive(Debug, Clone, Copy)]
pub struct UvCoordinates<'a, S> {
    /// u coordinate of each facevertex.
    pub u: &'a [S],
    /// v coordinate of each facevertex.
    pub v: &'a [S],
}

impl<'a, S> UvCoordinates<'a, S> {
    /// Pair up coordinate arrays.
    #[must_use]
    pub const fn new(u: &'a [S], v: &'a [S]) -> Self {
        Self { u, v }
    }
}

/// Which facevertices share a tangent frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity<'a> {
    /// Share by mesh vertex id.
    #[default]
    VertexIds,

    /// Share by a per-facevertex unique index array.
    Indices(&'a [u32]),
}

/// Tangent and bitangent of every facevertex.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentFrames<V> {
    /// Direction of increasing u, orthogonal to the normal.
    pub tangents: Vec<V>,
    /// Direction of increasing v, orthogonal to the normal.
    pub bitangents: Vec<V>,
}

impl<V> TangentFrames<V> {
    /// Number of facevertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tangents.len()
    }

    /// Whether there are no facevertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tangents.is_empty()
    }
}

/// Compute a tangent and bitangent for every facevertex.
///
/// Every face must be a triangle. With `ortho_tangents`, the bitangent is
/// also made orthogonal to the tangent. Frames are right-handed with
/// respect to the smoothed normal.
///
/// Frames are accumulated per connectivity index, so working memory grows
/// with the largest index rather than with the number of facevertices.
/// Indices should be compact; a single index near `u32::MAX` sizes the
/// per-index arrays to about four billion entries.
///
/// # Errors
///
/// - [`ShadingError::InvalidTopology`] if a face is not a triangle
/// - [`ShadingError::InvalidIndex`] if a vertex id is out of range
/// - [`ShadingError::LengthMismatch`] if u, v or the connectivity array
///   does not have one entry per facevertex
///
/// # Example
///
/// ```
/// use mesh_shading::{compute_tangents, Connectivity, FaceTopology, UvCoordinates};
/// use nalgebra::Vector3;
///
/// let positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(1.0, 1.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
/// ];
/// let vert_ids = [0, 1, 2, 0, 2, 3];
/// let topology = FaceTopology::new(&[3, 3], &vert_ids).unwrap();
/// let u = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0];
/// let v = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
///
/// let frames = compute_tangents(
///     &topology,
///     &positions,
///     UvCoordinates::new(&u, &v),
///     Connectivity::VertexIds,
///     true,
/// )
/// .unwrap();
///
/// assert_eq!(frames.len(), 6);
/// assert!(frames.tangents.iter().all(|t| (t - Vector3::x()).norm() < 1e-12));
/// assert!(frames.bitangents.iter().all(|b| (b - Vector3::y()).norm() < 1e-12));
/// ```
pub fn compute_tangents<V: GeometryVector>(
    topology: &FaceTopology<'_>,
    positions: &[V],
    uv: UvCoordinates<'_, V::Scalar>,
    connectivity: Connectivity<'_>,
    ortho_tangents: bool,
) -> ShadingResult<TangentFrames<V>> {
    let params = TangentParams::default().with_ortho_tangents(ortho_tangents);
    compute_tangents_with(topology, positions, uv, connectivity, &params, &mut NoopObserver)
}

/// [`compute_tangents`] with full parameters and stage reporting.
///
/// The UV set name, position name and index fallback in `params` are only
/// used by [`compute_tangents_from`].
///
/// # Errors
///
/// Same as [`compute_tangents`].
pub fn compute_tangents_with<V: GeometryVector>(
    topology: &FaceTopology<'_>,
    positions: &[V],
    uv: UvCoordinates<'_, V::Scalar>,
    connectivity: Connectivity<'_>,
    params: &TangentParams,
    observer: &mut impl StageObserver,
) -> ShadingResult<TangentFrames<V>> {
    let schedule = &params.schedule;
    let face_count = topology.face_count();
    let vert_ids = topology.vert_ids();

    info!(
        faces = face_count,
        vertices = positions.len(),
        ortho_tangents = params.ortho_tangents,
        "Computing tangent frames"
    );

    let start = Instant::now();
    topology.require_triangles()?;
    topology.check_vertex_ids(positions.len())?;
    check_length("u", vert_ids.len(), uv.u.len())?;
    check_length("v", vert_ids.len(), uv.v.len())?;

    let unique_ids = match connectivity {
        Connectivity::VertexIds => vert_ids,
        Connectivity::Indices(indices) => {
            check_length("uv indices", vert_ids.len(), indices.len())?;
            indices
        }
    };
    let bucket_count = unique_ids.iter().max().map_or(0, |&max| max as usize + 1);
    let face_offsets = topology.face_offsets(schedule)?;
    observer.stage_completed(Stage::Validate, start.elapsed(), vert_ids.len());

    let start = Instant::now();
    let bases = face_bases(vert_ids, &face_offsets, positions, uv.u, uv.v, schedule);
    observer.stage_completed(Stage::FaceGeometry, start.elapsed(), face_count);

    if tracing::enabled!(Level::DEBUG) {
        let degenerate = exec::count_indices(face_count, schedule, |f| {
            bases[f].u_tangent.is_zero() || bases[f].v_tangent.is_zero()
        });
        debug!(faces = face_count, degenerate, "Computed face bases");
    }

    let adjacency = AdjacencyBuilder::new(&face_offsets, unique_ids, bucket_count)
        .build_observed(schedule, &mut *observer)?;

    let start = Instant::now();
    let frames = resolve_tangent_frames(&adjacency, &bases, params.ortho_tangents, schedule);
    observer.stage_completed(Stage::Aggregate, start.elapsed(), frames.len());
    debug!(unique_indices = frames.len(), "Resolved tangent frames");

    let start = Instant::now();
    let expanded = exec::map_indices(unique_ids.len(), schedule, |fv| {
        let frame = &frames[unique_ids[fv] as usize];
        (frame.u_tangent, frame.v_tangent)
    });
    let (tangents, bitangents): (Vec<V>, Vec<V>) = expanded.into_iter().unzip();
    observer.stage_completed(Stage::Expand, start.elapsed(), tangents.len());

    info!(facevertices = tangents.len(), "Tangent frames complete");
    Ok(TangentFrames {
        tangents,
        bitangents,
    })
}

/// [`compute_tangents_with`] reading every input by name.
///
/// Looks up positions as `params.position`, coordinates by the UV set's
/// u and v names, and connectivity by its index name. A missing index
/// array is handled according to `params.index_fallback`.
///
/// # Errors
///
/// Returns [`ShadingError::MissingAttribute`] for an absent position, u or
/// v array, or an absent index array with [`IndexFallback::Error`].
/// Topology is checked first, so a non-triangle face is reported as
/// [`ShadingError::InvalidTopology`] even when inputs are also missing.
/// Otherwise the same as [`compute_tangents`].
pub fn compute_tangents_from<V: GeometryVector>(
    topology: &FaceTopology<'_>,
    attributes: &impl PrimitiveVariables<V>,
    params: &TangentParams,
) -> ShadingResult<TangentFrames<V>> {
    topology.require_triangles()?;

    let positions = attributes
        .vectors(&params.position)
        .ok_or_else(|| ShadingError::missing(params.position.as_str()))?;

    let u_name = params.uv_set.u_name();
    let v_name = params.uv_set.v_name();
    let u = attributes
        .scalars(&u_name)
        .ok_or_else(|| ShadingError::missing(u_name.as_str()))?;
    let v = attributes
        .scalars(&v_name)
        .ok_or_else(|| ShadingError::missing(v_name.as_str()))?;

    let indices_name = params.uv_set.indices_name();
    let connectivity = match (attributes.indices(&indices_name), params.index_fallback) {
        (Some(indices), _) => Connectivity::Indices(indices),
        (None, IndexFallback::VertexIds) => {
            debug!(uv_set = %params.uv_set, "No UV indices, sharing frames by vertex id");
            Connectivity::VertexIds
        }
        (None, IndexFallback::Error) => return Err(ShadingError::missing(indices_name)),
    };

    compute_tangents_with(
        topology,
        positions,
        UvCoordinates::new(u, v),
        connectivity,
        params,
        &mut NoopObserver,
    )
}

fn check_length(attribute: &'static str, expected: usize, actual: usize) -> ShadingResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ShadingError::LengthMismatch {
            attribute,
            expected,
            actual,
        })
    }
}
