//! Grouping kernels for the window selection policies
//!
//! Every policy follows the same two steps:
//!
//! - A [LevelPlan] is built once per trace. Histories have equal length, so
//!   the number of windows `M_i` used at each level is the same for all of
//!   them.
//! - Each history is re-binned into synthesised windows of `i` base samples
//!   and the variance-to-mean statistic is computed per level.
//!
//! ```text
//! Y(tau_i) = Var(windows) / Mean(windows) - 1
//! ```
//!
//! The variance is the population variance of the window sample. A window
//! sample with zero mean has no defined statistic, so `0.0` is substituted,
//! logged, and recorded in [HistoryCurve::substituted].

// policy kernels
pub(crate) mod choice;
pub(crate) mod covariance;
pub(crate) mod full;
pub(crate) mod mca;
pub(crate) mod skip;

pub use covariance::PairCurve;

// standard library
use std::ops::Range;

// crate modules
use crate::error::{Error, Result};

// nkinetics modules
use nkinetics_utils::SliceExt;

// external crates
use log::warn;

/// One synthesised gate width and the number of windows used for it
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Grouping level `i`, the number of base samples per window
    pub level: usize,
    /// Gate width `tau = i * dt_base` (s)
    pub tau: f64,
    /// Number of windows `M_i` contributing to the statistic
    pub windows: usize,
    /// Base samples consumed, if restricted to part of the history
    pub span: Option<Range<usize>>,
}

impl Level {
    pub(crate) fn new(level: usize, dt_base: f64, windows: usize) -> Self {
        Self {
            level,
            tau: level as f64 * dt_base,
            windows,
            span: None,
        }
    }
}

/// Grouping levels used by a policy, shared by every history of a trace
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPlan {
    /// Base sampling interval (s)
    pub dt_base: f64,
    /// Base intervals in each history
    pub samples_per_history: usize,
    /// Levels in increasing order of gate width
    pub levels: Vec<Level>,
}

impl LevelPlan {
    /// Gate widths of every level (s)
    pub fn taus(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.tau).collect()
    }

    /// Number of windows `M_i` used at every level
    pub fn m_points(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.windows).collect()
    }

    /// Number of levels in the plan
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if no levels are planned
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Variance-to-mean statistic of one history at every planned level
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryCurve {
    /// Index of the history this curve was calculated from
    pub index: usize,
    /// One value per planned level
    pub values: Vec<f64>,
    /// Levels where the zero-mean substitution was applied
    pub substituted: Vec<usize>,
}

impl HistoryCurve {
    pub(crate) fn with_capacity(index: usize, capacity: usize) -> Self {
        Self {
            index,
            values: Vec::with_capacity(capacity),
            substituted: Vec::new(),
        }
    }

    /// Record a statistic, substituting `0.0` where it is undefined
    pub(crate) fn push(&mut self, level: usize, value: Option<f64>) {
        match value {
            Some(v) => self.values.push(v),
            None => {
                warn!(
                    "History {}: zero mean window sample at level {level}, statistic set to 0.0",
                    self.index
                );
                self.substituted.push(level);
                self.values.push(0.0);
            }
        }
    }
}

/// Sum consecutive base samples into windows of `width`
///
/// Trailing samples that do not fill a complete window are dropped.
pub(crate) fn window_sums(counts: &[u32], width: usize) -> Vec<f64> {
    counts
        .chunks_exact(width)
        .map(|w| w.iter().map(|&c| c as u64).sum::<u64>() as f64)
        .collect()
}

/// `Var / Mean - 1` of a window sample, `None` for a zero mean
pub(crate) fn variance_to_mean(windows: &[f64], level: usize) -> Result<Option<f64>> {
    if windows.is_empty() {
        return Err(Error::EmptyWindowSample { level });
    }

    let mean = windows.try_mean()?;
    if mean == 0.0 {
        return Ok(None);
    }

    Ok(Some(windows.try_variance(0)? / mean - 1.0))
}
