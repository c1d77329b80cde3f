//! Optional per-stage telemetry.
//!
//! Pipelines report each completed stage to a caller-supplied
//! [`StageObserver`]. Nothing is recorded globally; the plain entry points
//! pass a [`NoopObserver`].

use std::time::Duration;

/// A pipeline stage. Stages run strictly one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Input checks, before any parallel work.
    Validate,
    /// Per-face normals or tangent bases.
    FaceGeometry,
    /// Atomic reference counting per bucket.
    Count,
    /// Prefix sum of the counts.
    Scan,
    /// Slot assignment and face index placement.
    Scatter,
    /// Per-bucket reduction.
    Aggregate,
    /// Re-expansion of per-bucket results to facevertices.
    Expand,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validate => "validate",
            Self::FaceGeometry => "face geometry",
            Self::Count => "count",
            Self::Scan => "scan",
            Self::Scatter => "scatter",
            Self::Aggregate => "aggregate",
            Self::Expand => "expand",
        };
        f.write_str(name)
    }
}

/// Receives a callback after each pipeline stage completes.
pub trait StageObserver {
    /// `items` is the number of faces, buckets or facevertices processed.
    fn stage_completed(&mut self, stage: Stage, elapsed: Duration, items: usize);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    #[inline]
    fn stage_completed(&mut self, _stage: Stage, _elapsed: Duration, _items: usize) {}
}

/// One recorded stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    /// Which stage.
    pub stage: Stage,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Items processed.
    pub items: usize,
}

/// Observer that records every stage in order.
///
/// # Example
///
/// ```
/// use mesh_shading::{compute_normals_with, FaceTopology, NormalParams, Stage, StageTimings};
/// use nalgebra::Vector3;
///
/// let positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
/// ];
/// let topology = FaceTopology::new(&[3], &[0, 1, 2]).unwrap();
///
/// let mut timings = StageTimings::new();
/// compute_normals_with(&topology, &positions, &NormalParams::default(), &mut timings).unwrap();
///
/// assert_eq!(timings.stages().first(), Some(&Stage::Validate));
/// assert!(timings.total() >= timings.get(Stage::Aggregate).unwrap_or_default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    timings: Vec<StageTiming>,
}

impl StageTimings {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded stages, in execution order.
    #[must_use]
    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        self.timings.iter().map(|t| t.stage).collect()
    }

    /// Time spent in `stage`, summed if it ran more than once.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<Duration> {
        self.timings
            .iter()
            .filter(|t| t.stage == stage)
            .map(|t| t.elapsed)
            .reduce(|a, b| a + b)
    }

    /// Time spent in all stages.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.timings.iter().map(|t| t.elapsed).sum()
    }
}

impl StageObserver for StageTimings {
    fn stage_completed(&mut self, stage: Stage, elapsed: Duration, items: usize) {
        self.timings.push(StageTiming {
            stage,
            elapsed,
            items,
        });
    }
}
