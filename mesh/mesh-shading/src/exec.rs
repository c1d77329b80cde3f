//! Fork-join helpers over index ranges.
//!
//! Every stage runs through these so that a sequential [`Schedule`] takes
//! the same code path as a parallel one. Each call returns only after all
//! indices have been processed.

use rayon::prelude::*;

use crate::params::Schedule;

/// Call `f` once for every index in `0..len`.
pub(crate) fn for_each_index<F>(len: usize, schedule: &Schedule, f: F)
where
    F: Fn(usize) + Sync + Send,
{
    if schedule.parallel {
        (0..len)
            .into_par_iter()
            .with_min_len(schedule.chunk_len())
            .for_each(f);
    } else {
        (0..len).for_each(f);
    }
}

/// Collect `f(i)` for every index in `0..len`, in index order.
pub(crate) fn map_indices<T, F>(len: usize, schedule: &Schedule, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if schedule.parallel {
        (0..len)
            .into_par_iter()
            .with_min_len(schedule.chunk_len())
            .map(f)
            .collect()
    } else {
        (0..len).map(f).collect()
    }
}

/// Count the indices in `0..len` for which `predicate` holds.
pub(crate) fn count_indices<F>(len: usize, schedule: &Schedule, predicate: F) -> usize
where
    F: Fn(usize) -> bool + Sync + Send,
{
    if schedule.parallel {
        (0..len)
            .into_par_iter()
            .with_min_len(schedule.chunk_len())
            .filter(|&i| predicate(i))
            .count()
    } else {
        (0..len).filter(|&i| predicate(i)).count()
    }
}
