//! Per-face geometry: normals and tangent bases.
//!
//! Everything here is computed once per face and never accumulated. The
//! aggregation kernels sum these contributions per vertex or per unique
//! tangent index.

use crate::exec;
use crate::params::Schedule;
use crate::topology::face_range;
use crate::vector::GeometryVector;

/// A normal and the two surface tangent directions of a face or vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentBasis<V> {
    /// Surface normal.
    pub normal: V,
    /// Direction of increasing u.
    pub u_tangent: V,
    /// Direction of increasing v.
    pub v_tangent: V,
}

impl<V: GeometryVector> TangentBasis<V> {
    /// All three vectors zero.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            normal: V::zero(),
            u_tangent: V::zero(),
            v_tangent: V::zero(),
        }
    }

    /// Component-wise sum of two bases.
    #[must_use]
    pub fn sum(self, other: Self) -> Self {
        Self {
            normal: self.normal.add(other.normal),
            u_tangent: self.u_tangent.add(other.u_tangent),
            v_tangent: self.v_tangent.add(other.v_tangent),
        }
    }
}

/// Unit normal of the triangle `(p0, p1, p2)`.
///
/// Counter-clockwise winding gives a normal facing the viewer. Zero-area
/// triangles give the zero vector.
///
/// # Example
///
/// ```
/// use mesh_shading::face_normal;
/// use nalgebra::Vector3;
///
/// let n = face_normal(
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
/// );
/// assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
/// ```
#[inline]
#[must_use]
pub fn face_normal<V: GeometryVector>(p0: V, p1: V, p2: V) -> V {
    p2.sub(p1).cross(p0.sub(p1)).normalize_or_zero()
}

/// Normal and UV tangent directions of a triangle.
///
/// `uv` holds the `[u, v]` coordinates at `p0`, `p1` and `p2`. The
/// bitangent follows increasing v. The u tangent lies along the u axis but
/// its sign is only settled by the handedness correction applied when
/// contributions are resolved per unique index, together with
/// orthogonalization against the normal.
#[must_use]
pub fn face_basis<V: GeometryVector>(
    p0: V,
    p1: V,
    p2: V,
    uv: [[V::Scalar; 2]; 3],
) -> TangentBasis<V> {
    let edge0 = p1.sub(p0);
    let edge1 = p2.sub(p0);

    let edge_uv0 = [uv[1][0] - uv[0][0], uv[1][1] - uv[0][1]];
    let edge_uv1 = [uv[2][0] - uv[0][0], uv[2][1] - uv[0][1]];

    let u_tangent = edge0
        .scale(-edge_uv1[1])
        .add(edge1.scale(edge_uv0[1]))
        .normalize_or_zero();
    let v_tangent = edge0
        .scale(-edge_uv1[0])
        .add(edge1.scale(edge_uv0[0]))
        .normalize_or_zero();

    TangentBasis {
        normal: face_normal(p0, p1, p2),
        u_tangent,
        v_tangent,
    }
}

/// Normal of every face, in face order.
///
/// Polygons use their first three vertices, so concave or non-planar
/// polygons get the normal of that corner. Vertex ids must already be
/// validated against `positions`.
pub fn face_normals<V: GeometryVector>(
    vert_ids: &[u32],
    face_offsets: &[u32],
    positions: &[V],
    schedule: &Schedule,
) -> Vec<V> {
    let face_count = face_offsets.len().saturating_sub(1);
    exec::map_indices(face_count, schedule, |face| {
        let start = face_offsets[face] as usize;
        let p0 = positions[vert_ids[start] as usize];
        let p1 = positions[vert_ids[start + 1] as usize];
        let p2 = positions[vert_ids[start + 2] as usize];
        face_normal(p0, p1, p2)
    })
}

/// Tangent basis of every triangle, in face order.
///
/// `u` and `v` are per-facevertex coordinates. The topology must be
/// triangulated and validated.
pub fn face_bases<V: GeometryVector>(
    vert_ids: &[u32],
    face_offsets: &[u32],
    positions: &[V],
    u: &[V::Scalar],
    v: &[V::Scalar],
    schedule: &Schedule,
) -> Vec<TangentBasis<V>> {
    let face_count = face_offsets.len().saturating_sub(1);
    exec::map_indices(face_count, schedule, |face| {
        let span = face_range(face_offsets, face);
        let (fv0, fv1, fv2) = (span.start, span.start + 1, span.start + 2);
        face_basis(
            positions[vert_ids[fv0] as usize],
            positions[vert_ids[fv1] as usize],
            positions[vert_ids[fv2] as usize],
            [[u[fv0], v[fv0]], [u[fv1], v[fv1]], [u[fv2], v[fv2]]],
        )
    })
}
