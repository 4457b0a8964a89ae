//! Skip policy: windows spaced further apart than a correlation time

// crate modules
use crate::error::{Error, Result};
use crate::kernel::{variance_to_mean, window_sums, HistoryCurve, Level, LevelPlan};
use crate::partition::History;

/// Absorbs rounding in `corr_time / tau` for exact multiples
const STRIDE_TOLERANCE: f64 = 1.0e-9;

/// Number of windows skipped after each retained window at `level`
///
/// `S_i = ceil(corr_time / (dt_base * i))`, so a zero correlation time keeps
/// every window.
pub(crate) fn skipped_windows(corr_time: f64, dt_base: f64, level: usize) -> usize {
    let ratio = corr_time / (dt_base * level as f64);
    (ratio - STRIDE_TOLERANCE).ceil().max(0.0) as usize
}

/// Step between retained windows, `S_i + 1`
///
/// Saturates for correlation times far beyond the history, which then keep
/// only the first window.
pub(crate) fn window_stride(corr_time: f64, dt_base: f64, level: usize) -> usize {
    skipped_windows(corr_time, dt_base, level).saturating_add(1)
}

/// Plan every level, keeping every `(S_i + 1)`-th window
pub(crate) fn plan(
    samples_per_history: usize,
    max_levels: usize,
    dt_base: f64,
    corr_time: f64,
) -> Result<LevelPlan> {
    let mut levels = Vec::with_capacity(max_levels);
    for i in 1..=max_levels {
        let available = samples_per_history / i;
        let stride = window_stride(corr_time, dt_base, i);
        let windows = available.div_ceil(stride);
        if windows == 0 {
            return Err(Error::EmptyWindowSample { level: i });
        }
        levels.push(Level::new(i, dt_base, windows));
    }

    Ok(LevelPlan {
        dt_base,
        samples_per_history,
        levels,
    })
}

/// Statistic over the retained windows of each level
pub(crate) fn compute(
    history: &History,
    plan: &LevelPlan,
    corr_time: f64,
) -> Result<HistoryCurve> {
    let mut curve = HistoryCurve::with_capacity(history.index, plan.len());
    for level in &plan.levels {
        let stride = window_stride(corr_time, plan.dt_base, level.level);
        let windows = window_sums(history.counts, level.level)
            .into_iter()
            .step_by(stride)
            .collect::<Vec<f64>>();
        curve.push(level.level, variance_to_mean(&windows, level.level)?);
    }
    Ok(curve)
}
