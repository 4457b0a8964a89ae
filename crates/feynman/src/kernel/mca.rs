//! MCA policy: no base sample contributes to more than one level
//!
//! Retained levels are taken in strides of `skip + 1` starting from level 1.
//! A cursor walks once through the history, and each retained level `i`
//! consumes `M_i * i` fresh base samples:
//!
//! ```text
//! history  |--- level 1 ---|------ level 3 ------|--------- level 5 ---------|..
//!          0             M_1              M_1 + 3 M_3
//! ```
//!
//! The window counts are fixed up front by the [McaMethod]:
//!
//! - `constant`: `M = floor(samples / sum(i))` for every retained level
//! - `A_over_k`: `M_i = floor(A / i)` with `A = floor(samples / n_retained)`
//!
//! so that both allocations use up (almost) the entire history.

// crate modules
use crate::config::McaMethod;
use crate::error::{Error, Result};
use crate::kernel::{variance_to_mean, window_sums, HistoryCurve, Level, LevelPlan};
use crate::partition::History;

// external crates
use log::debug;

/// Retained grouping levels, `1, 2 + skip, 3 + 2 * skip, ...`
pub(crate) fn retained_levels(max_levels: usize, skip: usize) -> Vec<usize> {
    (1..=max_levels).step_by(skip.saturating_add(1)).collect()
}

/// Allocate windows to every retained level and lay out their spans
pub(crate) fn plan(
    samples_per_history: usize,
    max_levels: usize,
    dt_base: f64,
    skip: usize,
    method: McaMethod,
) -> Result<LevelPlan> {
    let retained = retained_levels(max_levels, skip);
    let coarsest = retained.last().copied().unwrap_or(1);

    let windows: Vec<usize> = match method {
        McaMethod::Constant => {
            let total_width: usize = retained.iter().sum();
            let m = samples_per_history / total_width.max(1);
            vec![m; retained.len()]
        }
        McaMethod::AOverK => {
            let a = samples_per_history / retained.len().max(1);
            retained.iter().map(|&i| a / i).collect()
        }
    };

    // the coarsest level always has the fewest windows
    let last = windows.last().copied().unwrap_or(0);
    if last <= 1 {
        return Err(Error::InsufficientHistoryLength {
            level: coarsest,
            windows: last,
        });
    }

    let mut cursor = 0;
    let mut levels = Vec::with_capacity(retained.len());
    for (&i, &m) in retained.iter().zip(&windows) {
        let mut level = Level::new(i, dt_base, m);
        level.span = Some(cursor..cursor + m * i);
        debug!("MCA level {i}: {m} windows over samples {cursor}..{}", cursor + m * i);
        cursor += m * i;
        levels.push(level);
    }

    Ok(LevelPlan {
        dt_base,
        samples_per_history,
        levels,
    })
}

/// Statistic over each level's own span of base samples
pub(crate) fn compute(history: &History, plan: &LevelPlan) -> Result<HistoryCurve> {
    let mut curve = HistoryCurve::with_capacity(history.index, plan.len());
    for level in &plan.levels {
        let samples = match &level.span {
            Some(span) => &history.counts[span.clone()],
            None => history.counts,
        };
        let windows = window_sums(samples, level.level);
        curve.push(level.level, variance_to_mean(&windows, level.level)?);
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retained_level_strides() {
        assert_eq!(retained_levels(10, 0), (1..=10).collect::<Vec<_>>());
        assert_eq!(retained_levels(10, 1), vec![1, 3, 5, 7, 9]);
        assert_eq!(retained_levels(10, 3), vec![1, 5, 9]);
        assert_eq!(retained_levels(10, usize::MAX), vec![1]);
    }

    #[test]
    fn largest_skip_keeps_first_level() {
        let plan = plan(50, 5, 1.0e-3, usize::MAX, McaMethod::Constant).unwrap();
        assert_eq!(plan.m_points(), vec![50]);
        assert_eq!(plan.levels[0].span, Some(0..50));
    }

    #[test]
    fn constant_too_short() {
        // levels 1, 2, 3 => 6 samples per round, 11 / 6 = 1 window each
        assert!(matches!(
            plan(11, 3, 1.0, 0, McaMethod::Constant),
            Err(Error::InsufficientHistoryLength {
                level: 3,
                windows: 1
            })
        ));
    }

    #[test]
    fn constant_allocation() {
        // levels 1, 3, 5 => 9 samples per "round", 100 / 9 = 11 windows each
        let plan = plan(100, 5, 1.0e-3, 1, McaMethod::Constant).unwrap();
        assert_eq!(plan.m_points(), vec![11, 11, 11]);
        assert_eq!(plan.levels[0].span, Some(0..11));
        assert_eq!(plan.levels[1].span, Some(11..44));
        assert_eq!(plan.levels[2].span, Some(44..99));
    }

    #[test]
    fn a_over_k_allocation() {
        // A = 120 / 3 = 40 samples per level
        let plan = plan(120, 5, 1.0e-3, 1, McaMethod::AOverK).unwrap();
        assert_eq!(plan.m_points(), vec![40, 13, 8]);
        assert_eq!(plan.levels[2].span, Some(79..119));
    }

    #[test]
    fn a_over_k_too_short() {
        // A = 12 / 2 = 6 => level 4 only gets a single window
        assert!(matches!(
            plan(12, 4, 1.0, 2, McaMethod::AOverK),
            Err(Error::InsufficientHistoryLength {
                level: 4,
                windows: 1
            })
        ));
    }

    #[test]
    fn zero_mean_first_level_is_substituted() {
        // the first level only sees the leading zeros
        let counts = [0, 0, 0, 0, 1, 3, 2, 2, 4, 0, 1, 5];
        let history = History {
            index: 0,
            counts: &counts,
        };

        let plan = plan(12, 2, 1.0, 0, McaMethod::Constant).unwrap();
        assert_eq!(plan.m_points(), vec![4, 4]);

        let curve = compute(&history, &plan).unwrap();
        assert_eq!(curve.values[0], 0.0);
        assert_eq!(curve.substituted, vec![1]);
        // level 2 windows 4, 4, 4, 6 => mean 4.5, var 0.75
        assert_eq!(curve.values[1], 0.75 / 4.5 - 1.0);
    }
}
