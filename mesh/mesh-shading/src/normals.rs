//! Smoothed and flat normals from face topology.

use std::time::Instant;

use tracing::{Level, debug, info};

use crate::adjacency::AdjacencyBuilder;
use crate::aggregate::average_normals;
use crate::attributes::PrimitiveVariables;
use crate::error::{ShadingError, ShadingResult};
use crate::exec;
use crate::face::face_normals;
use crate::observer::{NoopObserver, Stage, StageObserver};
use crate::params::{Interpolation, NormalParams};
use crate::topology::FaceTopology;
use crate::vector::GeometryVector;

/// Compute normals over the requested domain.
///
/// - [`Interpolation::Vertex`] - one normal per position, the normalized sum
///   of the normals of every face using that vertex
/// - [`Interpolation::Uniform`] - one normal per face
/// - [`Interpolation::FaceVarying`] - the vertex normals, one per facevertex
///
/// Faces with more than three vertices use the plane of their first three.
/// Degenerate faces contribute zero, and a vertex no face references gets
/// the zero vector.
///
/// # Errors
///
/// Returns [`ShadingError::InvalidIndex`] if a vertex id is not below
/// `positions.len()`, or [`ShadingError::CountOverflow`] if the adjacency
/// cannot be addressed with `u32` offsets.
///
/// # Example
///
/// ```
/// use mesh_shading::{compute_normals, FaceTopology, Interpolation};
/// use nalgebra::Vector3;
///
/// // Unit quad as two triangles.
/// let positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(1.0, 1.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
/// ];
/// let topology = FaceTopology::new(&[3, 3], &[0, 1, 2, 0, 2, 3]).unwrap();
///
/// let normals = compute_normals(&topology, &positions, Interpolation::Vertex).unwrap();
/// assert_eq!(normals.len(), 4);
/// assert!(normals.iter().all(|n| *n == Vector3::z()));
/// ```
pub fn compute_normals<V: GeometryVector>(
    topology: &FaceTopology<'_>,
    positions: &[V],
    interpolation: Interpolation,
) -> ShadingResult<Vec<V>> {
    let params = NormalParams::default().with_interpolation(interpolation);
    compute_normals_with(topology, positions, &params, &mut NoopObserver)
}

/// [`compute_normals`] with full parameters and stage reporting.
///
/// # Errors
///
/// Same as [`compute_normals`].
pub fn compute_normals_with<V: GeometryVector>(
    topology: &FaceTopology<'_>,
    positions: &[V],
    params: &NormalParams,
    observer: &mut impl StageObserver,
) -> ShadingResult<Vec<V>> {
    let schedule = &params.schedule;
    let face_count = topology.face_count();
    let vert_ids = topology.vert_ids();

    info!(
        faces = face_count,
        vertices = positions.len(),
        interpolation = %params.interpolation,
        "Computing normals"
    );

    let start = Instant::now();
    topology.check_vertex_ids(positions.len())?;
    let face_offsets = topology.face_offsets(schedule)?;
    observer.stage_completed(Stage::Validate, start.elapsed(), vert_ids.len());

    let start = Instant::now();
    let face_normals = face_normals(vert_ids, &face_offsets, positions, schedule);
    observer.stage_completed(Stage::FaceGeometry, start.elapsed(), face_count);

    if tracing::enabled!(Level::DEBUG) {
        let degenerate = exec::count_indices(face_count, schedule, |f| face_normals[f].is_zero());
        debug!(faces = face_count, degenerate, "Computed face normals");
    }

    if params.interpolation == Interpolation::Uniform {
        info!(normals = face_normals.len(), "Normals complete");
        return Ok(face_normals);
    }

    let adjacency = AdjacencyBuilder::new(&face_offsets, vert_ids, positions.len())
        .build_observed(schedule, &mut *observer)?;

    let start = Instant::now();
    let vertex_normals = average_normals(&adjacency, &face_normals, schedule);
    observer.stage_completed(Stage::Aggregate, start.elapsed(), vertex_normals.len());

    if tracing::enabled!(Level::DEBUG) {
        let zero = exec::count_indices(vertex_normals.len(), schedule, |v| {
            vertex_normals[v].is_zero()
        });
        debug!(vertices = vertex_normals.len(), zero, "Averaged vertex normals");
    }

    let normals = match params.interpolation {
        Interpolation::FaceVarying => {
            let start = Instant::now();
            let expanded = exec::map_indices(vert_ids.len(), schedule, |fv| {
                vertex_normals[vert_ids[fv] as usize]
            });
            observer.stage_completed(Stage::Expand, start.elapsed(), expanded.len());
            expanded
        }
        Interpolation::Vertex | Interpolation::Uniform => vertex_normals,
    };

    info!(normals = normals.len(), "Normals complete");
    Ok(normals)
}

/// [`compute_normals_with`] reading positions by name.
///
/// Positions are looked up as `params.position` (`"P"` by default).
///
/// # Errors
///
/// Returns [`ShadingError::MissingAttribute`] if there is no such vector
/// array, otherwise the same as [`compute_normals`].
///
/// # Example
///
/// ```
/// use mesh_shading::{compute_normals_from, AttributeMap, FaceTopology, NormalParams};
/// use nalgebra::Vector3;
///
/// let mut attributes = AttributeMap::new();
/// attributes.insert_vectors(
///     "P",
///     vec![
///         Vector3::new(0.0_f32, 0.0, 0.0),
///         Vector3::new(0.0, 1.0, 0.0),
///         Vector3::new(0.0, 0.0, 1.0),
///     ],
/// );
/// let topology = FaceTopology::new(&[3], &[0, 1, 2]).unwrap();
///
/// let normals = compute_normals_from(&topology, &attributes, &NormalParams::uniform()).unwrap();
/// assert_eq!(normals, vec![Vector3::x()]);
/// ```
pub fn compute_normals_from<V: GeometryVector>(
    topology: &FaceTopology<'_>,
    attributes: &impl PrimitiveVariables<V>,
    params: &NormalParams,
) -> ShadingResult<Vec<V>> {
    let positions = attributes
        .vectors(&params.position)
        .ok_or_else(|| ShadingError::missing(params.position.as_str()))?;
    compute_normals_with(topology, positions, params, &mut NoopObserver)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::observer::StageTimings;
    use crate::params::Schedule;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    type V = Vector3<f64>;

    fn quad() -> Vec<V> {
        vec![
            V::new(0.0, 0.0, 0.0),
            V::new(1.0, 0.0, 0.0),
            V::new(1.0, 1.0, 0.0),
            V::new(0.0, 1.0, 0.0),
        ]
    }

    const QUAD_VPF: [u32; 2] = [3, 3];
    const QUAD_IDS: [u32; 6] = [0, 1, 2, 0, 2, 3];

    #[test]
    fn quad_vertex_normals_point_up() {
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let normals = compute_normals(&topology, &quad(), Interpolation::Vertex).unwrap();
        assert_eq!(normals.len(), 4);
        for n in &normals {
            assert_relative_eq!(*n, V::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn quad_uniform_normals_per_face() {
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let normals = compute_normals(&topology, &quad(), Interpolation::Uniform).unwrap();
        assert_eq!(normals.len(), 2);
        for n in &normals {
            assert_relative_eq!(*n, V::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn face_varying_follows_vertex_ids() {
        // Two triangles folded along the shared edge 0-2.
        let positions = vec![
            V::new(0.0, 0.0, 0.0),
            V::new(1.0, 0.0, 0.0),
            V::new(1.0, 1.0, 0.0),
            V::new(0.0, 1.0, 1.0),
        ];
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let per_vertex = compute_normals(&topology, &positions, Interpolation::Vertex).unwrap();
        let per_fv = compute_normals(&topology, &positions, Interpolation::FaceVarying).unwrap();

        assert_eq!(per_fv.len(), QUAD_IDS.len());
        for (fv, &vertex) in QUAD_IDS.iter().enumerate() {
            assert_eq!(per_fv[fv], per_vertex[vertex as usize]);
        }
    }

    #[test]
    fn unreferenced_vertex_gets_zero() {
        let mut positions = quad();
        positions.push(V::new(5.0, 5.0, 5.0));
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let normals = compute_normals(&topology, &positions, Interpolation::Vertex).unwrap();
        assert_eq!(normals.len(), 5);
        assert_eq!(normals[4], V::zeros());
    }

    #[test]
    fn degenerate_face_contributes_nothing() {
        let positions = vec![
            V::new(0.0, 0.0, 0.0),
            V::new(1.0, 0.0, 0.0),
            V::new(0.0, 1.0, 0.0),
            V::new(2.0, 0.0, 0.0),
        ];
        // Second face is collinear.
        let topology = FaceTopology::new(&[3, 3], &[0, 1, 2, 0, 1, 3]).unwrap();
        let normals = compute_normals(&topology, &positions, Interpolation::Vertex).unwrap();
        assert_relative_eq!(normals[0], V::z(), epsilon = 1e-12);
        assert_eq!(normals[3], V::zeros());
        assert!(normals.iter().all(|n| n.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let topology = FaceTopology::new(&[3], &[0, 1, 4]).unwrap();
        let err = compute_normals(&topology, &quad(), Interpolation::Uniform).unwrap_err();
        assert!(matches!(err, ShadingError::InvalidIndex { index: 4, limit: 4, .. }));
    }

    #[test]
    fn stages_reported_in_order() {
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let mut timings = StageTimings::new();
        compute_normals_with(&topology, &quad(), &NormalParams::face_varying(), &mut timings)
            .unwrap();
        assert_eq!(
            timings.stages(),
            vec![
                Stage::Validate,
                Stage::FaceGeometry,
                Stage::Count,
                Stage::Scan,
                Stage::Scatter,
                Stage::Aggregate,
                Stage::Expand,
            ]
        );

        let mut timings = StageTimings::new();
        compute_normals_with(&topology, &quad(), &NormalParams::uniform(), &mut timings).unwrap();
        assert_eq!(timings.stages(), vec![Stage::Validate, Stage::FaceGeometry]);
    }

    #[test]
    fn sequential_matches_parallel() {
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let parallel = NormalParams::vertex().with_schedule(Schedule::parallel().with_min_chunk_len(1));
        let sequential = NormalParams::vertex().with_schedule(Schedule::sequential());

        let a = compute_normals_with(&topology, &quad(), &parallel, &mut NoopObserver).unwrap();
        let b = compute_normals_with(&topology, &quad(), &sequential, &mut NoopObserver).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn named_positions() {
        let topology = FaceTopology::new(&QUAD_VPF, &QUAD_IDS).unwrap();
        let mut attributes: AttributeMap<V> = AttributeMap::new();
        attributes.insert_vectors("Pref", quad());

        let err = compute_normals_from(&topology, &attributes, &NormalParams::default())
            .unwrap_err();
        assert!(matches!(err, ShadingError::MissingAttribute { ref name } if name == "P"));

        let params = NormalParams::default().with_position("Pref");
        let normals = compute_normals_from(&topology, &attributes, &params).unwrap();
        assert_eq!(normals.len(), 4);
    }
}
