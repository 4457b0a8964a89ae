//! Cross-history statistics

// crate modules
use crate::error::{Error, Result};
use crate::kernel::HistoryCurve;
use crate::trace::RawTrace;

// nkinetics modules
use nkinetics_utils::SliceExt;

/// Mean and standard error of the mean at every level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateCurve {
    /// Mean over histories
    pub mean: Vec<f64>,
    /// Sample standard deviation over histories divided by `sqrt(N)`
    pub std_error: Vec<f64>,
}

impl AggregateCurve {
    /// Number of levels
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// True if there are no levels
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Combine per-history curves into a mean curve with uncertainties
///
/// At least two histories are needed for the sample standard deviation to
/// exist, and every curve must have the same number of levels.
///
/// ```rust
/// # use nkinetics_feynman::{aggregate, HistoryCurve};
/// let curves: Vec<HistoryCurve> = [[0.1, 0.4], [0.3, 0.2]]
///     .iter()
///     .enumerate()
///     .map(|(index, values)| HistoryCurve {
///         index,
///         values: values.to_vec(),
///         substituted: vec![],
///     })
///     .collect();
///
/// let result = aggregate(&curves).unwrap();
/// assert!((result.mean[0] - 0.2).abs() < 1e-15);
/// assert!((result.std_error[0] - 0.1).abs() < 1e-15);
/// ```
pub fn aggregate(curves: &[HistoryCurve]) -> Result<AggregateCurve> {
    if curves.len() < 2 {
        return Err(Error::InsufficientHistories {
            required: 2,
            found: curves.len(),
        });
    }

    let n_levels = curves[0].values.len();
    if let Some(curve) = curves.iter().find(|c| c.values.len() != n_levels) {
        return Err(Error::LengthMismatch {
            expected: n_levels,
            found: curve.values.len(),
        });
    }

    let mut result = AggregateCurve {
        mean: Vec::with_capacity(n_levels),
        std_error: Vec::with_capacity(n_levels),
    };

    for level in 0..n_levels {
        let column = curves.iter().map(|c| c.values[level]).collect::<Vec<f64>>();
        result.mean.push(column.try_mean()?);
        result.std_error.push(column.try_std_error()?);
    }

    Ok(result)
}

/// Detector count rate with the standard error of its mean (s^-1)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CountRate {
    /// Mean count rate
    pub mean: f64,
    /// Standard error of the mean count rate
    pub std_error: f64,
}

/// Mean count rate of a trace, independent of any grouping
///
/// Every base interval gives one rate sample `c_k / dt_base`. The result is
/// the mean of these samples and its standard error.
///
/// ```rust
/// # use nkinetics_feynman::{count_rate, RawTrace};
/// let trace = RawTrace::new("ch1", 0.5, vec![1, 3, 1, 3]).unwrap();
/// let rate = count_rate(&trace).unwrap();
/// assert_eq!(rate.mean, 4.0);
/// ```
pub fn count_rate(trace: &RawTrace) -> Result<CountRate> {
    let dt = trace.dt_base();
    let rates = trace
        .counts()
        .iter()
        .map(|&c| c as f64 / dt)
        .collect::<Vec<f64>>();

    Ok(CountRate {
        mean: rates.try_mean()?,
        std_error: rates.try_std_error()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(index: usize, values: &[f64]) -> HistoryCurve {
        HistoryCurve {
            index,
            values: values.to_vec(),
            substituted: Vec::new(),
        }
    }

    #[test]
    fn three_histories_two_levels() {
        let curves = [
            curve(0, &[0.10, 1.0]),
            curve(1, &[0.20, 2.0]),
            curve(2, &[0.60, 6.0]),
        ];
        let result = aggregate(&curves).unwrap();

        for (level, column) in [[0.10, 0.20, 0.60], [1.0, 2.0, 6.0]].iter().enumerate() {
            let mean = column.iter().sum::<f64>() / 3.0;
            let var = column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 2.0;
            assert_eq!(result.mean[level], mean);
            assert_eq!(result.std_error[level], var.sqrt() / 3.0_f64.sqrt());
        }

        // second level is exactly 3, sqrt(7) / sqrt(3)
        assert_eq!(result.mean[1], 3.0);
        assert_eq!(result.std_error[1], 7.0_f64.sqrt() / 3.0_f64.sqrt());
    }

    #[test]
    fn single_history_is_not_enough() {
        assert!(matches!(
            aggregate(&[curve(0, &[1.0])]),
            Err(Error::InsufficientHistories {
                required: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn ragged_curves() {
        assert!(matches!(
            aggregate(&[curve(0, &[1.0, 2.0]), curve(1, &[1.0])]),
            Err(Error::LengthMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn constant_trace_rate() {
        let trace = RawTrace::new("ch1", 1.0e-3, vec![5; 100]).unwrap();
        let rate = count_rate(&trace).unwrap();
        assert_eq!(rate.mean, 5.0 / 1.0e-3);
        assert_eq!(rate.std_error, 0.0);
    }
}
