//! Polygon face topology.
//!
//! Faces are described the way most interchange formats store them: a
//! vertex count per face and one flat array of vertex ids, so face `f`
//! owns `vert_ids[offsets[f]..offsets[f + 1]]`. Each (face, vertex) slot in
//! that flat array is a *facevertex*.

use std::ops::Range;

use crate::error::{ShadingError, ShadingResult};
use crate::offsets::exclusive_scan;
use crate::params::Schedule;

/// Read-only view of a polygon mesh's connectivity.
///
/// Construction checks that every face has at least three vertices and
/// that the counts add up to the number of vertex ids. Vertex id range is
/// checked separately against a position array with
/// [`check_vertex_ids`](Self::check_vertex_ids).
///
/// # Example
///
/// ```
/// use mesh_shading::FaceTopology;
///
/// let verts_per_face = [3, 4];
/// let vert_ids = [0, 1, 2, 0, 2, 3, 4];
/// let topology = FaceTopology::new(&verts_per_face, &vert_ids).unwrap();
///
/// assert_eq!(topology.face_count(), 2);
/// assert_eq!(topology.face_vertex_count(), 7);
/// assert!(!topology.is_triangulated());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FaceTopology<'a> {
    verts_per_face: &'a [u32],
    vert_ids: &'a [u32],
}

impl<'a> FaceTopology<'a> {
    /// Wrap per-face vertex counts and flattened vertex ids.
    ///
    /// # Errors
    ///
    /// - [`ShadingError::InvalidTopology`] if a face has fewer than three
    ///   vertices or the counts do not sum to `vert_ids.len()`
    /// - [`ShadingError::CountOverflow`] if there are more facevertices than
    ///   a `u32` counter can address
    pub fn new(verts_per_face: &'a [u32], vert_ids: &'a [u32]) -> ShadingResult<Self> {
        if let Some((face, &count)) = verts_per_face.iter().enumerate().find(|(_, c)| **c < 3) {
            return Err(ShadingError::invalid_topology(format!(
                "face {face} has {count} vertices (minimum is 3)"
            )));
        }

        let total = verts_per_face
            .iter()
            .fold(0u64, |acc, &c| acc.saturating_add(u64::from(c)));
        if total != vert_ids.len() as u64 {
            return Err(ShadingError::invalid_topology(format!(
                "face vertex counts sum to {total} but there are {} vertex ids",
                vert_ids.len()
            )));
        }
        if total > u64::from(u32::MAX) {
            return Err(ShadingError::CountOverflow { total });
        }

        Ok(Self {
            verts_per_face,
            vert_ids,
        })
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.verts_per_face.len()
    }

    /// Number of facevertices (length of the vertex id array).
    #[inline]
    #[must_use]
    pub fn face_vertex_count(&self) -> usize {
        self.vert_ids.len()
    }

    /// Whether there are no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verts_per_face.is_empty()
    }

    /// Vertex count of each face.
    #[inline]
    #[must_use]
    pub fn verts_per_face(&self) -> &'a [u32] {
        self.verts_per_face
    }

    /// Flattened vertex ids.
    #[inline]
    #[must_use]
    pub fn vert_ids(&self) -> &'a [u32] {
        self.vert_ids
    }

    /// Whether every face is a triangle.
    #[must_use]
    pub fn is_triangulated(&self) -> bool {
        self.verts_per_face.iter().all(|&c| c == 3)
    }

    /// Smallest per-face vertex count, `None` if empty.
    #[must_use]
    pub fn min_vertices_per_face(&self) -> Option<u32> {
        self.verts_per_face.iter().copied().min()
    }

    /// Largest per-face vertex count, `None` if empty.
    #[must_use]
    pub fn max_vertices_per_face(&self) -> Option<u32> {
        self.verts_per_face.iter().copied().max()
    }

    /// Fail unless every face is a triangle.
    ///
    /// # Errors
    ///
    /// Returns [`ShadingError::InvalidTopology`] naming the first
    /// non-triangular face.
    pub fn require_triangles(&self) -> ShadingResult<()> {
        match self.verts_per_face.iter().position(|&c| c != 3) {
            None => Ok(()),
            Some(face) => Err(ShadingError::invalid_topology(format!(
                "face {face} has {} vertices; only triangles are supported",
                self.verts_per_face[face]
            ))),
        }
    }

    /// Fail if any vertex id is not below `vertex_count`.
    ///
    /// # Errors
    ///
    /// Returns [`ShadingError::InvalidIndex`] for the first bad id.
    pub fn check_vertex_ids(&self, vertex_count: usize) -> ShadingResult<()> {
        check_indices(self.vert_ids, vertex_count, "vertex")
    }

    /// Start of each face's span in the facevertex arrays.
    ///
    /// Returns `face_count() + 1` offsets.
    ///
    /// # Errors
    ///
    /// Cannot fail for a topology built with [`new`](Self::new); the
    /// overflow check is carried by the scan.
    pub fn face_offsets(&self, schedule: &Schedule) -> ShadingResult<Vec<u32>> {
        exclusive_scan(self.verts_per_face, schedule)
    }
}

/// Facevertex range of face `face` given its offsets.
#[inline]
pub(crate) fn face_range(offsets: &[u32], face: usize) -> Range<usize> {
    offsets[face] as usize..offsets[face + 1] as usize
}

/// Fail if any index is not below `limit`.
pub(crate) fn check_indices(
    indices: &[u32],
    limit: usize,
    attribute: &'static str,
) -> ShadingResult<()> {
    match indices.iter().find(|&&i| i as usize >= limit) {
        None => Ok(()),
        Some(&index) => Err(ShadingError::InvalidIndex {
            attribute,
            index,
            limit,
        }),
    }
}
