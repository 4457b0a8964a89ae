//! Covariance policy: two synchronised detector channels
//!
//! Both channels are grouped exactly as in the full policy, using the same
//! window boundaries. Alongside each channel's own statistic the normalised
//! cross-covariance is calculated per level:
//!
//! ```text
//! Y_12(tau_i) = Cov(w_1, w_2) / sqrt(Mean(w_1) * Mean(w_2))
//! ```
//!
//! There is no `- 1` term. Uncorrelated Poisson noise in separate detectors
//! does not contribute to the cross-covariance.

// crate modules
use crate::error::{Error, Result};
use crate::kernel::{variance_to_mean, window_sums, HistoryCurve, LevelPlan};
use crate::partition::History;

// nkinetics modules
use nkinetics_utils::SliceExt;

/// Results for one pair of synchronised histories
#[derive(Debug, Clone, PartialEq)]
pub struct PairCurve {
    /// Variance-to-mean statistic of the first channel
    pub first: HistoryCurve,
    /// Variance-to-mean statistic of the second channel
    pub second: HistoryCurve,
    /// Normalised cross-covariance between the channels
    pub cross: HistoryCurve,
}

/// Statistics of both channels and their cross term at every level
pub(crate) fn compute(first: &History, second: &History, plan: &LevelPlan) -> Result<PairCurve> {
    if first.len() != second.len() {
        return Err(Error::LengthMismatch {
            expected: first.len(),
            found: second.len(),
        });
    }

    let index = first.index;
    let mut pair = PairCurve {
        first: HistoryCurve::with_capacity(index, plan.len()),
        second: HistoryCurve::with_capacity(index, plan.len()),
        cross: HistoryCurve::with_capacity(index, plan.len()),
    };

    for level in &plan.levels {
        let i = level.level;
        let w1 = window_sums(first.counts, i);
        let w2 = window_sums(second.counts, i);

        pair.first.push(i, variance_to_mean(&w1, i)?);
        pair.second.push(i, variance_to_mean(&w2, i)?);
        pair.cross.push(i, cross_covariance(&w1, &w2, i)?);
    }

    Ok(pair)
}

/// `Cov / sqrt(Mean_1 * Mean_2)`, `None` if either mean is zero
fn cross_covariance(w1: &[f64], w2: &[f64], level: usize) -> Result<Option<f64>> {
    if w1.is_empty() || w2.is_empty() {
        return Err(Error::EmptyWindowSample { level });
    }

    let norm = w1.try_mean()? * w2.try_mean()?;
    if norm == 0.0 {
        return Ok(None);
    }

    Ok(Some(w1.try_covariance(w2, 0)? / norm.sqrt()))
}
