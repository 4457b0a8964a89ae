//! Splitting raw traces into independent histories

// crate modules
use crate::error::{Error, Result};
use crate::trace::check_time_step;

// external crates
use log::debug;

/// Tolerance on `dt_max / dt_base` so that exact multiples survive rounding
const LEVEL_TOLERANCE: f64 = 1.0e-9;

/// One independent, contiguous segment of a raw trace
///
/// Histories borrow from the trace they were cut from, so every task in the
/// parallel runner reads the same underlying data without copying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct History<'a> {
    /// Position of the history in the trace, from 0
    pub index: usize,
    /// Counts per base interval
    pub counts: &'a [u32],
}

impl History<'_> {
    /// Number of base intervals in the history
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True for an empty history
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Result of splitting one trace
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    /// Equal-length histories in trace order
    pub histories: Vec<History<'a>>,
    /// Number of grouping levels, `floor(dt_max / dt_base)`
    pub max_levels: usize,
    /// Base intervals per history, `floor(len / n_histories)`
    pub samples_per_history: usize,
}

/// Number of grouping levels that fit in `dt_max`
///
/// ```rust
/// # use nkinetics_feynman::max_levels;
/// assert_eq!(max_levels(1.0e-3, 5.0e-3).unwrap(), 5);
/// assert_eq!(max_levels(0.1, 0.3).unwrap(), 3);
/// assert_eq!(max_levels(1.0e-3, 0.5e-3).unwrap(), 0);
/// ```
pub fn max_levels(dt_base: f64, dt_max: f64) -> Result<usize> {
    check_time_step(dt_base)?;
    if !(dt_max.is_finite() && dt_max > 0.0) {
        return Err(Error::InvalidParameter {
            name: "dt_max",
            value: dt_max.to_string(),
            reason: "must be finite and positive",
        });
    }
    Ok((dt_max / dt_base + LEVEL_TOLERANCE).floor() as usize)
}

/// Split a raw count sequence into `n_histories` equal histories
///
/// The trace is truncated to `samples_per_history * n_histories` and split
/// into contiguous, non-overlapping chunks. The trailing remainder is
/// discarded.
///
/// ```rust
/// # use nkinetics_feynman::partition;
/// let counts: Vec<u32> = (0..103).collect();
/// let split = partition(&counts, 10, 1.0, 5.0).unwrap();
///
/// assert_eq!(split.samples_per_history, 10);
/// assert_eq!(split.max_levels, 5);
/// assert_eq!(split.histories.len(), 10);
/// assert_eq!(split.histories[1].counts[0], 10);
/// ```
///
/// Fails if no window can be formed at the coarsest level, i.e. when
/// `max_levels < 1` or `samples_per_history < max_levels`.
pub fn partition(
    counts: &[u32],
    n_histories: usize,
    dt_base: f64,
    dt_max: f64,
) -> Result<Partition<'_>> {
    if n_histories == 0 {
        return Err(Error::InsufficientHistories {
            required: 1,
            found: 0,
        });
    }

    let max_levels = max_levels(dt_base, dt_max)?;
    let samples_per_history = counts.len() / n_histories;

    if max_levels < 1 || samples_per_history < max_levels {
        return Err(Error::InsufficientData {
            samples_per_history,
            max_levels,
        });
    }

    let usable = samples_per_history * n_histories;
    debug!(
        "Partitioned {} samples into {n_histories} histories of {samples_per_history} ({} discarded)",
        counts.len(),
        counts.len() - usable
    );

    let histories = counts[..usable]
        .chunks_exact(samples_per_history)
        .enumerate()
        .map(|(index, counts)| History { index, counts })
        .collect();

    Ok(Partition {
        histories,
        max_levels,
        samples_per_history,
    })
}
