//! Per-bucket reduction of face contributions.
//!
//! Each bucket's span in a [`FaceAdjacency`] is reduced by exactly one
//! worker, so no synchronization is needed here. All reductions are sums,
//! so the scheduling-dependent order of faces within a span only matters
//! up to floating-point rounding.

use crate::adjacency::FaceAdjacency;
use crate::exec;
use crate::face::TangentBasis;
use crate::params::Schedule;
use crate::vector::GeometryVector;

/// Sum the normals of the faces in `faces` and normalize.
///
/// An empty span gives the zero vector.
#[must_use]
pub fn average_normal<V: GeometryVector>(faces: &[u32], face_normals: &[V]) -> V {
    faces
        .iter()
        .fold(V::zero(), |acc, &face| acc.add(face_normals[face as usize]))
        .normalize_or_zero()
}

/// Averaged normal for every bucket of `adjacency`.
pub fn average_normals<V: GeometryVector>(
    adjacency: &FaceAdjacency,
    face_normals: &[V],
    schedule: &Schedule,
) -> Vec<V> {
    exec::map_indices(adjacency.bucket_count(), schedule, |bucket| {
        average_normal(adjacency.faces_for(bucket), face_normals)
    })
}

/// Sum the bases of the faces in `faces`, component by component.
#[must_use]
pub fn accumulate_basis<V: GeometryVector>(
    faces: &[u32],
    face_bases: &[TangentBasis<V>],
) -> TangentBasis<V> {
    faces
        .iter()
        .fold(TangentBasis::zero(), |acc, &face| acc.sum(face_bases[face as usize]))
}

/// Turn a summed basis into a right-handed tangent frame.
///
/// 1. Normalize the normal and both tangents
/// 2. Remove each tangent's component along the normal and renormalize
/// 3. With `ortho_tangents`, also remove the v tangent's component along
///    the u tangent and renormalize
/// 4. Negate the u tangent if `(u × v) · n` is negative
///
/// Zero-length directions stay zero at every step.
///
/// # Example
///
/// ```
/// use mesh_shading::{resolve_basis, TangentBasis};
/// use nalgebra::Vector3;
///
/// let summed = TangentBasis {
///     normal: Vector3::new(0.0, 0.0, 2.0),
///     u_tangent: Vector3::new(-2.0, 0.0, 0.5),
///     v_tangent: Vector3::new(0.0, 3.0, 0.0),
/// };
/// let frame = resolve_basis(summed, true);
///
/// assert_eq!(frame.normal, Vector3::new(0.0, 0.0, 1.0));
/// assert_eq!(frame.u_tangent, Vector3::new(1.0, 0.0, 0.0));
/// assert_eq!(frame.v_tangent, Vector3::new(0.0, 1.0, 0.0));
/// ```
#[must_use]
pub fn resolve_basis<V: GeometryVector>(
    summed: TangentBasis<V>,
    ortho_tangents: bool,
) -> TangentBasis<V> {
    let normal = summed.normal.normalize_or_zero();
    let mut u_tangent = summed.u_tangent.normalize_or_zero();
    let mut v_tangent = summed.v_tangent.normalize_or_zero();

    u_tangent = reject(u_tangent, normal);
    v_tangent = reject(v_tangent, normal);

    if ortho_tangents {
        v_tangent = reject(v_tangent, u_tangent);
    }

    if u_tangent.cross(v_tangent).dot(normal) < nalgebra::zero::<V::Scalar>() {
        u_tangent = u_tangent.scale(-nalgebra::one::<V::Scalar>());
    }

    TangentBasis {
        normal,
        u_tangent,
        v_tangent,
    }
}

/// Component of `v` orthogonal to the unit (or zero) vector `axis`, normalized.
#[inline]
fn reject<V: GeometryVector>(v: V, axis: V) -> V {
    v.sub(axis.scale(v.dot(axis))).normalize_or_zero()
}

/// Resolved tangent frame for every bucket of `adjacency`.
pub fn resolve_tangent_frames<V: GeometryVector>(
    adjacency: &FaceAdjacency,
    face_bases: &[TangentBasis<V>],
    ortho_tangents: bool,
    schedule: &Schedule,
) -> Vec<TangentBasis<V>> {
    exec::map_indices(adjacency.bucket_count(), schedule, |bucket| {
        resolve_basis(
            accumulate_basis(adjacency.faces_for(bucket), face_bases),
            ortho_tangents,
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::adjacency::AdjacencyBuilder;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    type V = Vector3<f64>;

    #[test]
    fn average_of_two_faces() {
        let normals = [V::new(0.0, 0.0, 1.0), V::new(1.0, 0.0, 0.0)];
        let n = average_normal(&[0, 1], &normals);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(n, V::new(s, 0.0, s), epsilon = 1e-12);
    }

    #[test]
    fn average_is_order_independent() {
        let normals = [
            V::new(0.0, 0.0, 1.0),
            V::new(0.3, 0.1, 0.9).normalize(),
            V::new(-0.2, 0.7, 0.5).normalize(),
        ];
        let a = average_normal(&[0, 1, 2], &normals);
        let b = average_normal(&[2, 0, 1], &normals);
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }

    #[test]
    fn empty_span_gives_zero() {
        let normals: [V; 0] = [];
        assert_eq!(average_normal(&[], &normals), V::zeros());

        let basis = resolve_basis(accumulate_basis::<V>(&[], &[]), true);
        assert_eq!(basis, TangentBasis::zero());
    }

    #[test]
    fn opposing_faces_cancel_to_zero() {
        let normals = [V::new(0.0, 0.0, 1.0), V::new(0.0, 0.0, -1.0)];
        let n = average_normal(&[0, 1], &normals);
        assert_eq!(n, V::zeros());
    }

    #[test]
    fn handedness_flips_u_tangent() {
        let summed = TangentBasis {
            normal: V::new(0.0, 0.0, 1.0),
            u_tangent: V::new(-1.0, 0.0, 0.0),
            v_tangent: V::new(0.0, 1.0, 0.0),
        };
        let frame = resolve_basis(summed, false);
        assert_relative_eq!(frame.u_tangent, V::new(1.0, 0.0, 0.0));
        assert!(frame.u_tangent.cross(frame.v_tangent).dot(frame.normal) > 0.0);
    }

    #[test]
    fn handedness_flip_in_single_precision() {
        let summed = TangentBasis {
            normal: Vector3::new(0.0_f32, 0.0, 2.0),
            u_tangent: Vector3::new(-3.0_f32, 0.0, 0.0),
            v_tangent: Vector3::new(0.0_f32, 0.5, 0.0),
        };
        let frame = resolve_basis(summed, true);
        assert_relative_eq!(frame.u_tangent, Vector3::new(1.0_f32, 0.0, 0.0));
        assert_relative_eq!(frame.v_tangent, Vector3::new(0.0_f32, 1.0, 0.0));
    }

    #[test]
    fn ortho_tangents_makes_frame_orthonormal() {
        let summed = TangentBasis {
            normal: V::new(0.1, 0.0, 1.0),
            u_tangent: V::new(1.0, 0.2, 0.3),
            v_tangent: V::new(0.6, 1.0, -0.2),
        };
        let frame = resolve_basis(summed, true);
        assert_relative_eq!(frame.normal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.u_tangent.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.v_tangent.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.u_tangent.dot(frame.normal), 0.0, epsilon = 1e-12);
        assert_relative_eq!(frame.v_tangent.dot(frame.normal), 0.0, epsilon = 1e-12);
        assert_relative_eq!(frame.u_tangent.dot(frame.v_tangent), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn without_ortho_tangents_stay_skewed() {
        let summed = TangentBasis {
            normal: V::new(0.0, 0.0, 1.0),
            u_tangent: V::new(1.0, 0.0, 0.0),
            v_tangent: V::new(1.0, 1.0, 0.0),
        };
        let frame = resolve_basis(summed, false);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(frame.v_tangent, V::new(s, s, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn frames_per_bucket() {
        let offsets = [0, 3, 6];
        let st = [0, 1, 2, 3, 4, 5];
        let adjacency = AdjacencyBuilder::new(&offsets, &st, 7)
            .build(&Schedule::default())
            .unwrap();
        let basis = TangentBasis {
            normal: V::new(0.0, 0.0, 1.0),
            u_tangent: V::new(1.0, 0.0, 0.0),
            v_tangent: V::new(0.0, 1.0, 0.0),
        };
        let frames = resolve_tangent_frames(&adjacency, &[basis, basis], true, &Schedule::default());

        assert_eq!(frames.len(), 7);
        for frame in &frames[..6] {
            assert_relative_eq!(frame.u_tangent, basis.u_tangent);
        }
        assert_eq!(frames[6], TangentBasis::zero());
    }
}
