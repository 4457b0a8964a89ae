//! Choice policy: a random subset of windows at every level

// crate modules
use crate::error::{Error, Result};
use crate::kernel::{variance_to_mean, window_sums, HistoryCurve, Level, LevelPlan};
use crate::partition::History;

// external crates
use rand::seq::index;
use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Golden ratio increment used to spread history indices across seeds
const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Plan every level with `M_i = floor(windows_available * fraction)`
pub(crate) fn plan(
    samples_per_history: usize,
    max_levels: usize,
    dt_base: f64,
    fraction: f64,
) -> Result<LevelPlan> {
    let mut levels = Vec::with_capacity(max_levels);
    for i in 1..=max_levels {
        let available = samples_per_history / i;
        let windows = ((available as f64 * fraction).floor() as usize).min(available);
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

/// Independent generator for one history
///
/// Depends only on the run seed and the history index, so results do not
/// change with the number of workers or the order they finish in.
pub(crate) fn history_rng(seed: u64, index: usize) -> Pcg64 {
    Pcg64::seed_from_u64(seed ^ (index as u64).wrapping_mul(SEED_SPREAD))
}

/// Statistic over `M_i` windows drawn without replacement at each level
pub(crate) fn compute(history: &History, plan: &LevelPlan, seed: u64) -> Result<HistoryCurve> {
    let mut rng = history_rng(seed, history.index);
    let mut curve = HistoryCurve::with_capacity(history.index, plan.len());

    for level in &plan.levels {
        let all = window_sums(history.counts, level.level);
        let selected = index::sample(&mut rng, all.len(), level.windows.min(all.len()))
            .into_iter()
            .map(|k| all[k])
            .collect::<Vec<f64>>();
        curve.push(level.level, variance_to_mean(&selected, level.level)?);
    }

    Ok(curve)
}
