//! Property-based tests for the scan, adjacency and aggregation stages.
//!
//! Run with: cargo test -p mesh-shading -- proptest

use mesh_shading::{
    AdjacencyBuilder, Connectivity, FaceTopology, Interpolation, NoopObserver, NormalParams,
    Schedule, UvCoordinates, compute_normals, compute_normals_with, compute_tangents,
    exclusive_scan,
};
use nalgebra::Vector3;
use proptest::prelude::*;

type V = Vector3<f64>;

// =============================================================================
// Strategies
// =============================================================================

fn arb_schedule() -> impl Strategy<Value = Schedule> {
    (any::<bool>(), 1usize..64).prop_map(|(parallel, chunk)| Schedule {
        parallel,
        min_chunk_len: chunk,
    })
}

/// Polygon topology with face sizes 3..=6 over `bucket_count` buckets.
fn arb_polygons() -> impl Strategy<Value = (Vec<u32>, Vec<u32>, usize)> {
    (1usize..40).prop_flat_map(|bucket_count| {
        let faces = prop::collection::vec(
            prop::collection::vec(0..bucket_count as u32, 3..=6),
            0..60,
        );
        faces.prop_map(move |faces| {
            let verts_per_face = faces.iter().map(|f| f.len() as u32).collect();
            let vert_ids = faces.into_iter().flatten().collect();
            (verts_per_face, vert_ids, bucket_count)
        })
    })
}

/// Height field grid with `n` x `n` vertices and per-vertex heights in
/// `-amplitude..amplitude`.
///
/// Every face normal has a positive z component, so vertex sums never
/// cancel.
fn arb_height_field(amplitude: f64) -> impl Strategy<Value = (u32, Vec<f64>)> {
    (2u32..8).prop_flat_map(move |n| {
        prop::collection::vec(-amplitude..amplitude, (n * n) as usize).prop_map(move |h| (n, h))
    })
}

fn height_field_mesh(n: u32, heights: &[f64]) -> (Vec<V>, Vec<u32>) {
    let step = 1.0 / f64::from(n - 1);
    let positions = (0..n * n)
        .map(|k| {
            let (i, j) = (k % n, k / n);
            V::new(f64::from(i) * step, f64::from(j) * step, heights[k as usize])
        })
        .collect();

    let mut vert_ids = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = j * n + i;
            vert_ids.extend_from_slice(&[a, a + 1, a + n + 1, a, a + n + 1, a + n]);
        }
    }
    (positions, vert_ids)
}

// =============================================================================
// Property Tests: Prefix sums
// =============================================================================

proptest! {
    /// Offsets start at zero and differ by exactly the counts.
    #[test]
    fn scan_differences_equal_counts(
        counts in prop::collection::vec(0u32..1000, 0..500),
        schedule in arb_schedule(),
    ) {
        let offsets = exclusive_scan(&counts, &schedule).unwrap();

        prop_assert_eq!(offsets.len(), counts.len() + 1);
        prop_assert_eq!(offsets[0], 0);
        for (i, &count) in counts.iter().enumerate() {
            prop_assert_eq!(offsets[i + 1] - offsets[i], count);
        }
    }

    /// The scan result does not depend on how work is split.
    #[test]
    fn scan_is_schedule_independent(
        counts in prop::collection::vec(0usize..100, 0..300),
        schedule in arb_schedule(),
    ) {
        let expected = exclusive_scan(&counts, &Schedule::sequential()).unwrap();
        prop_assert_eq!(exclusive_scan(&counts, &schedule).unwrap(), expected);
    }
}

// =============================================================================
// Property Tests: Adjacency
// =============================================================================

proptest! {
    /// Every facevertex appears exactly once, under its own bucket.
    #[test]
    fn adjacency_spans_match_references(
        (vpf, ids, bucket_count) in arb_polygons(),
        schedule in arb_schedule(),
    ) {
        let topology = FaceTopology::new(&vpf, &ids).unwrap();
        let offsets = topology.face_offsets(&schedule).unwrap();
        let adjacency = AdjacencyBuilder::new(&offsets, &ids, bucket_count)
            .build(&schedule)
            .unwrap();

        prop_assert_eq!(adjacency.entry_count(), ids.len());
        prop_assert_eq!(adjacency.bucket_count(), bucket_count);

        for bucket in 0..bucket_count {
            let mut expected: Vec<u32> = Vec::new();
            for face in 0..vpf.len() {
                let span = offsets[face] as usize..offsets[face + 1] as usize;
                for &id in &ids[span] {
                    if id as usize == bucket {
                        expected.push(face as u32);
                    }
                }
            }
            let mut actual = adjacency.faces_for(bucket).to_vec();
            actual.sort_unstable();

            prop_assert_eq!(adjacency.valence(bucket), expected.len());
            prop_assert_eq!(actual, expected);
        }
    }
}

// =============================================================================
// Property Tests: Normals
// =============================================================================

proptest! {
    /// Face normals are either zero (degenerate) or unit length.
    #[test]
    fn uniform_normals_are_unit_or_zero(
        positions in prop::collection::vec(prop::array::uniform3(-10.0..10.0f64), 3..20),
        faces in prop::collection::vec(prop::array::uniform3(0usize..1000), 1..30),
    ) {
        let n = positions.len();
        let positions: Vec<V> = positions.into_iter().map(V::from).collect();
        let ids: Vec<u32> = faces.iter().flatten().map(|&i| (i % n) as u32).collect();
        let vpf = vec![3; faces.len()];
        let topology = FaceTopology::new(&vpf, &ids).unwrap();

        let normals = compute_normals(&topology, &positions, Interpolation::Uniform).unwrap();

        prop_assert_eq!(normals.len(), faces.len());
        for normal in &normals {
            let length = normal.norm();
            prop_assert!(length == 0.0 || (length - 1.0).abs() < 1e-5, "length {}", length);
        }
    }

    /// Reordering faces does not change vertex normals.
    #[test]
    fn vertex_normals_are_order_independent(
        (n, heights) in arb_height_field(0.3),
        rotation in 0usize..64,
    ) {
        let (positions, ids) = height_field_mesh(n, &heights);
        let vpf = vec![3; ids.len() / 3];
        let topology = FaceTopology::new(&vpf, &ids).unwrap();
        let expected = compute_normals(&topology, &positions, Interpolation::Vertex).unwrap();

        let mut faces: Vec<&[u32]> = ids.chunks(3).collect();
        let len = faces.len();
        faces.rotate_left(rotation % len);
        faces.reverse();
        let shuffled: Vec<u32> = faces.concat();
        let topology = FaceTopology::new(&vpf, &shuffled).unwrap();
        let params = NormalParams::vertex()
            .with_schedule(Schedule::parallel().with_min_chunk_len(1));
        let actual = compute_normals_with(&topology, &positions, &params, &mut NoopObserver)
            .unwrap();

        for (a, b) in actual.iter().zip(&expected) {
            prop_assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
        }
    }
}

// =============================================================================
// Property Tests: Tangent frames
// =============================================================================

proptest! {
    /// Orthogonalized frames are orthonormal and right-handed everywhere.
    #[test]
    fn ortho_frames_are_right_handed((n, heights) in arb_height_field(0.1)) {
        let (positions, ids) = height_field_mesh(n, &heights);
        let vpf = vec![3; ids.len() / 3];
        let topology = FaceTopology::new(&vpf, &ids).unwrap();
        let s: Vec<f64> = ids.iter().map(|&v| positions[v as usize].x).collect();
        let t: Vec<f64> = ids.iter().map(|&v| positions[v as usize].y).collect();

        let frames = compute_tangents(
            &topology,
            &positions,
            UvCoordinates::new(&s, &t),
            Connectivity::VertexIds,
            true,
        )
        .unwrap();
        let normals = compute_normals(&topology, &positions, Interpolation::FaceVarying).unwrap();

        prop_assert_eq!(frames.len(), ids.len());
        for ((u, v), normal) in frames.tangents.iter().zip(&frames.bitangents).zip(&normals) {
            prop_assert!((u.norm() - 1.0).abs() < 1e-9);
            prop_assert!((v.norm() - 1.0).abs() < 1e-9);
            prop_assert!(u.dot(normal).abs() < 1e-9);
            prop_assert!(v.dot(normal).abs() < 1e-9);
            prop_assert!(u.dot(v).abs() < 1e-9);
            prop_assert!(u.cross(v).dot(normal) > 0.0);
        }
    }
}
