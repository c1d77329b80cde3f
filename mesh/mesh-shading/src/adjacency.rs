//! Bucket-to-face adjacency in compressed sparse row form.
//!
//! Built without hash maps in three fork-join passes over the faces:
//!
//! 1. **Count** - every facevertex atomically increments its bucket's counter
//! 2. **Offsets** - an exclusive scan turns counts into span starts
//! 3. **Scatter** - after resetting the counters, every facevertex
//!    fetch-and-increments its bucket's counter to claim a unique slot in
//!    the bucket's span and stores its face index there
//!
//! A bucket is a vertex index when averaging normals, or a unique tangent
//! index when resolving tangent frames. Offsets and span lengths are
//! deterministic; the order of faces inside a span depends on scheduling.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use tracing::debug;

use crate::counters::AtomicCounters;
use crate::error::ShadingResult;
use crate::exec;
use crate::observer::{NoopObserver, Stage, StageObserver};
use crate::offsets::exclusive_scan;
use crate::params::Schedule;
use crate::topology::face_range;

/// Faces referencing each bucket.
///
/// A face appears once per facevertex that maps to the bucket, so a face
/// listing the same bucket twice contributes twice.
///
/// # Example
///
/// ```
/// use mesh_shading::{AdjacencyBuilder, Schedule};
///
/// // Two triangles sharing the edge 0-2.
/// let face_offsets = [0, 3, 6];
/// let vert_ids = [0, 1, 2, 0, 2, 3];
///
/// let adjacency = AdjacencyBuilder::new(&face_offsets, &vert_ids, 4)
///     .build(&Schedule::default())
///     .unwrap();
///
/// assert_eq!(adjacency.valence(0), 2);
/// assert_eq!(adjacency.faces_for(1), &[0]);
/// assert_eq!(adjacency.entry_count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceAdjacency {
    offsets: Vec<u32>,
    faces: Vec<u32>,
}

impl FaceAdjacency {
    /// Number of buckets.
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of references over all buckets.
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether there are no references at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Span offsets, `bucket_count() + 1` entries.
    #[inline]
    #[must_use]
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Faces referencing `bucket`, in no particular order.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= bucket_count()`.
    #[inline]
    #[must_use]
    pub fn faces_for(&self, bucket: usize) -> &[u32] {
        &self.faces[face_range(&self.offsets, bucket)]
    }

    /// Number of references to `bucket`.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= bucket_count()`.
    #[inline]
    #[must_use]
    pub fn valence(&self, bucket: usize) -> usize {
        (self.offsets[bucket + 1] - self.offsets[bucket]) as usize
    }
}

/// Builds a [`FaceAdjacency`] from face spans and per-facevertex bucket ids.
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyBuilder<'a> {
    face_offsets: &'a [u32],
    bucket_ids: &'a [u32],
    bucket_count: usize,
}

impl<'a> AdjacencyBuilder<'a> {
    /// Prepare a build.
    ///
    /// * `face_offsets` - facevertex span of each face (`face_count + 1` entries)
    /// * `bucket_ids` - bucket of each facevertex (vertex ids or UV indices)
    /// * `bucket_count` - size of the bucket domain
    #[must_use]
    pub fn new(face_offsets: &'a [u32], bucket_ids: &'a [u32], bucket_count: usize) -> Self {
        Self {
            face_offsets,
            bucket_ids,
            bucket_count,
        }
    }

    fn face_count(&self) -> usize {
        self.face_offsets.len().saturating_sub(1)
    }

    fn buckets_of(&self, face: usize) -> &'a [u32] {
        &self.bucket_ids[face_range(self.face_offsets, face)]
    }

    /// Run the count, scan and scatter passes.
    ///
    /// # Errors
    ///
    /// Returns [`ShadingError::CountOverflow`](crate::ShadingError::CountOverflow)
    /// if the reference total does not fit in `u32`.
    ///
    /// # Panics
    ///
    /// Panics if a bucket id is `>= bucket_count` or a face span runs past
    /// `bucket_ids`. Callers validate indices beforehand.
    pub fn build(&self, schedule: &Schedule) -> ShadingResult<FaceAdjacency> {
        self.build_observed(schedule, &mut NoopObserver)
    }

    /// Like [`build`](Self::build), reporting the [`Stage::Count`],
    /// [`Stage::Scan`] and [`Stage::Scatter`] passes to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    ///
    /// # Panics
    ///
    /// Same as [`build`](Self::build).
    pub fn build_observed(
        &self,
        schedule: &Schedule,
        observer: &mut impl StageObserver,
    ) -> ShadingResult<FaceAdjacency> {
        let face_count = self.face_count();
        let mut counters = AtomicCounters::new(self.bucket_count);

        let start = Instant::now();
        exec::for_each_index(face_count, schedule, |face| {
            for &bucket in self.buckets_of(face) {
                counters.increment(bucket as usize);
            }
        });
        observer.stage_completed(Stage::Count, start.elapsed(), face_count);

        let start = Instant::now();
        let offsets = exclusive_scan(&counters.snapshot(), schedule)?;
        let total = offsets[self.bucket_count] as usize;
        observer.stage_completed(Stage::Scan, start.elapsed(), self.bucket_count);

        debug!(
            buckets = self.bucket_count,
            faces = face_count,
            references = total,
            "Counted bucket references"
        );

        let start = Instant::now();
        let slots: Vec<AtomicU32> = (0..total).map(|_| AtomicU32::new(0)).collect();
        counters.reset();

        exec::for_each_index(face_count, schedule, |face| {
            for &bucket in self.buckets_of(face) {
                let bucket = bucket as usize;
                let slot = counters.increment(bucket);
                slots[(offsets[bucket] + slot) as usize].store(face as u32, Ordering::Relaxed);
            }
        });

        let faces = slots.into_iter().map(AtomicU32::into_inner).collect();
        observer.stage_completed(Stage::Scatter, start.elapsed(), total);

        Ok(FaceAdjacency { offsets, faces })
    }
}
