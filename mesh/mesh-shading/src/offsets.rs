//! Prefix-sum offsets for compressed adjacency.
//!
//! Counts are not directly useful for parallel processing: a worker that
//! wants to write bucket `i` needs to know where bucket `i` starts. An
//! exclusive scan turns per-bucket counts into those start offsets.
//!
//! The parallel form is a classic two-sweep scan:
//!
//! 1. Reduce each chunk of counts to a partial sum (parallel)
//! 2. Propagate the carries left to right (sequential, one step per chunk)
//! 3. Rewrite each chunk with its true offsets (parallel)
//!
//! Integer addition is associative, so the result does not depend on the
//! chunk length or on the number of workers.

use rayon::prelude::*;

use crate::error::{ShadingError, ShadingResult};
use crate::params::Schedule;

/// An integer type that can be prefix-summed with overflow detection.
pub trait ScanValue: Copy + Send + Sync + PartialEq + std::fmt::Debug {
    /// Additive identity.
    const ZERO: Self;

    /// Addition that reports overflow as `None`.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Widen to `u64` for error reporting, saturating.
    fn to_u64_saturating(self) -> u64;
}

macro_rules! impl_scan_value {
    ($($t:ty),*) => {
        $(
            impl ScanValue for $t {
                const ZERO: Self = 0;

                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }

                #[inline]
                fn to_u64_saturating(self) -> u64 {
                    u64::try_from(self).unwrap_or(u64::MAX)
                }
            }
        )*
    };
}

impl_scan_value!(u32, u64, usize);

/// Compute exclusive prefix-sum offsets from counts.
///
/// Returns `counts.len() + 1` values: `offsets[0] == 0`,
/// `offsets[i + 1] - offsets[i] == counts[i]`, and the last entry is the
/// total. An empty input yields `[0]`.
///
/// # Errors
///
/// Returns [`ShadingError::CountOverflow`] if the total does not fit in `T`.
///
/// # Example
///
/// ```
/// use mesh_shading::{exclusive_scan, Schedule};
///
/// let offsets = exclusive_scan(&[3u32, 0, 2, 4], &Schedule::default()).unwrap();
/// assert_eq!(offsets, vec![0, 3, 3, 5, 9]);
/// ```
pub fn exclusive_scan<T: ScanValue>(counts: &[T], schedule: &Schedule) -> ShadingResult<Vec<T>> {
    let n = counts.len();
    if n == 0 {
        return Ok(vec![T::ZERO]);
    }

    let chunk_len = schedule.chunk_len();

    let partials: Vec<Option<T>> = if schedule.parallel {
        counts.par_chunks(chunk_len).map(chunk_sum).collect()
    } else {
        counts.chunks(chunk_len).map(chunk_sum).collect()
    };

    let mut starts = Vec::with_capacity(partials.len());
    let mut carry = T::ZERO;
    for partial in partials {
        starts.push(carry);
        carry = partial
            .and_then(|sum| carry.checked_add(sum))
            .ok_or_else(|| overflow(counts))?;
    }

    let mut offsets = vec![T::ZERO; n + 1];
    if schedule.parallel {
        offsets[..n]
            .par_chunks_mut(chunk_len)
            .zip(counts.par_chunks(chunk_len))
            .zip(starts.par_iter())
            .for_each(|((out, chunk), &start)| fill_chunk(out, chunk, start));
    } else {
        offsets[..n]
            .chunks_mut(chunk_len)
            .zip(counts.chunks(chunk_len))
            .zip(starts.iter())
            .for_each(|((out, chunk), &start)| fill_chunk(out, chunk, start));
    }

    // offsets[n - 1] + counts[n - 1], already known from the carry pass.
    offsets[n] = carry;

    Ok(offsets)
}

fn chunk_sum<T: ScanValue>(chunk: &[T]) -> Option<T> {
    chunk
        .iter()
        .try_fold(T::ZERO, |acc, &count| acc.checked_add(count))
}

fn fill_chunk<T: ScanValue>(out: &mut [T], counts: &[T], start: T) {
    let mut acc = start;
    for (slot, &count) in out.iter_mut().zip(counts) {
        *slot = acc;
        // Running sums are bounded by the checked total.
        if let Some(next) = acc.checked_add(count) {
            acc = next;
        }
    }
}

fn overflow<T: ScanValue>(counts: &[T]) -> ShadingError {
    let total = counts
        .iter()
        .fold(0u64, |acc, &c| acc.saturating_add(c.to_u64_saturating()));
    ShadingError::CountOverflow { total }
}
