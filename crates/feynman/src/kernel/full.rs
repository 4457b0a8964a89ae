//! Full policy: every disjoint window at every level

// crate modules
use crate::error::Result;
use crate::kernel::{variance_to_mean, window_sums, HistoryCurve, Level, LevelPlan};
use crate::partition::History;

/// Plan every level from 1 to `max_levels`
///
/// At level `i` the history holds `floor(samples_per_history / i)` complete
/// windows, and all of them are used.
pub(crate) fn plan(samples_per_history: usize, max_levels: usize, dt_base: f64) -> LevelPlan {
    let levels = (1..=max_levels)
        .map(|i| Level::new(i, dt_base, samples_per_history / i))
        .collect();

    LevelPlan {
        dt_base,
        samples_per_history,
        levels,
    }
}

/// Statistic over every complete window of each level
///
/// The same base samples contribute to every level, which is why values at
/// neighbouring gate widths are strongly correlated.
pub(crate) fn compute(history: &History, plan: &LevelPlan) -> Result<HistoryCurve> {
    let mut curve = HistoryCurve::with_capacity(history.index, plan.len());
    for level in &plan.levels {
        let windows = window_sums(history.counts, level.level);
        curve.push(level.level, variance_to_mean(&windows, level.level)?);
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_window_counts() {
        let plan = plan(100, 5, 1.0e-3);
        assert_eq!(plan.m_points(), vec![100, 50, 33, 25, 20]);
        assert_eq!(plan.levels[3].tau, 4.0e-3);
        assert!(plan.levels.iter().all(|l| l.span.is_none()));
    }

    #[test]
    fn alternating_counts() {
        // level 1 windows: 0,2,0,2,... mean 1, var 1 => 0
        // level 2 windows: all 2 => var 0 => -1
        let counts = [0, 2, 0, 2, 0, 2, 0, 2];
        let history = History {
            index: 0,
            counts: &counts,
        };

        let curve = compute(&history, &plan(8, 2, 1.0)).unwrap();
        assert_eq!(curve.values, vec![0.0, -1.0]);
        assert!(curve.substituted.is_empty());
    }
}
