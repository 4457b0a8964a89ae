//! Window selection policies and their dispatch

// standard library
use std::fmt;

// crate modules
use crate::config::{McaMethod, Mode, RunConfig};
use crate::error::{Error, Result};
use crate::kernel::{choice, covariance, full, mca, skip, HistoryCurve, LevelPlan, PairCurve};
use crate::partition::History;

// nkinetics modules
use nkinetics_utils::f;

/// A validated window selection policy
///
/// Built from a [RunConfig] with [Policy::from_config()], which checks that
/// every parameter the mode needs is present and sensible. Nothing is
/// computed until this succeeds, so configuration mistakes are reported
/// before any parallel work starts.
///
/// ```rust
/// # use nkinetics_feynman::{Mode, Policy, RunConfig, Error};
/// // Choice needs a fraction
/// let config = RunConfig::new(Mode::Choice, 10, 5.0e-3);
/// assert!(matches!(
///     Policy::from_config(&config),
///     Err(Error::MissingParameter { name: "fraction", .. })
/// ));
///
/// let policy = Policy::from_config(&config.with_fraction(0.5)).unwrap();
/// assert_eq!(policy, Policy::Choice { fraction: 0.5 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Every disjoint window at every level
    Full,
    /// Uniform random `fraction` of windows per level
    Choice { fraction: f64 },
    /// Windows separated by at least `corr_time` seconds
    Skip { corr_time: f64 },
    /// Disjoint base samples per retained level, `skip` levels apart
    Mca { skip: usize, method: McaMethod },
    /// Two channels and their cross-covariance
    Covariance,
    /// Full policy applied to the sum of all traces
    Sum,
}

impl Policy {
    /// Validate the mode-specific parameters of a run
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let mode = config.mode;
        let params = &config.params;

        match mode {
            Mode::Full => Ok(Policy::Full),
            Mode::Covariance => Ok(Policy::Covariance),
            Mode::Sum => Ok(Policy::Sum),
            Mode::Choice => {
                let fraction = params.fraction.ok_or(Error::MissingParameter {
                    name: "fraction",
                    mode,
                })?;
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return Err(Error::InvalidParameter {
                        name: "fraction",
                        value: f!("{fraction}"),
                        reason: "must be in the range (0, 1]",
                    });
                }
                Ok(Policy::Choice { fraction })
            }
            Mode::Skip => {
                let corr_time = params.corr_time.ok_or(Error::MissingParameter {
                    name: "corr_time",
                    mode,
                })?;
                if !(corr_time.is_finite() && corr_time >= 0.0) {
                    return Err(Error::InvalidParameter {
                        name: "corr_time",
                        value: f!("{corr_time}"),
                        reason: "must be finite and non-negative",
                    });
                }
                Ok(Policy::Skip { corr_time })
            }
            Mode::Mca => {
                let skip = params.skip_mca.ok_or(Error::MissingParameter {
                    name: "skip_mca",
                    mode,
                })?;
                let method = params.method_mca.ok_or(Error::MissingParameter {
                    name: "method_mca",
                    mode,
                })?;
                Ok(Policy::Mca { skip, method })
            }
        }
    }

    /// The calculation mode this policy implements
    pub fn mode(&self) -> Mode {
        match self {
            Policy::Full => Mode::Full,
            Policy::Choice { .. } => Mode::Choice,
            Policy::Skip { .. } => Mode::Skip,
            Policy::Mca { .. } => Mode::Mca,
            Policy::Covariance => Mode::Covariance,
            Policy::Sum => Mode::Sum,
        }
    }

    /// True if the policy draws random numbers
    pub fn is_random(&self) -> bool {
        matches!(self, Policy::Choice { .. })
    }

    /// Policy parameters as `(name, value)` pairs for output headers
    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        match self {
            Policy::Choice { fraction } => vec![("fraction", f!("{fraction}"))],
            Policy::Skip { corr_time } => vec![("corr_time", f!("{corr_time}"))],
            Policy::Mca { skip, method } => {
                vec![("skip_mca", f!("{skip}")), ("method_mca", f!("{method}"))]
            }
            _ => Vec::new(),
        }
    }

    /// Lay out the grouping levels for histories of a given length
    ///
    /// ```rust
    /// # use nkinetics_feynman::Policy;
    /// let plan = Policy::Full.plan(100, 5, 1.0e-3).unwrap();
    /// assert_eq!(plan.m_points(), vec![100, 50, 33, 25, 20]);
    /// ```
    pub fn plan(
        &self,
        samples_per_history: usize,
        max_levels: usize,
        dt_base: f64,
    ) -> Result<LevelPlan> {
        match *self {
            Policy::Full | Policy::Covariance | Policy::Sum => {
                Ok(full::plan(samples_per_history, max_levels, dt_base))
            }
            Policy::Choice { fraction } => {
                choice::plan(samples_per_history, max_levels, dt_base, fraction)
            }
            Policy::Skip { corr_time } => {
                skip::plan(samples_per_history, max_levels, dt_base, corr_time)
            }
            Policy::Mca { skip, method } => {
                mca::plan(samples_per_history, max_levels, dt_base, skip, method)
            }
        }
    }

    /// Statistic of a single history at every planned level
    ///
    /// The `seed` is only used by random policies. The covariance policy
    /// treats a single history like the full policy, see
    /// [Policy::compute_pair()] for the two-channel calculation.
    pub fn compute(&self, history: &History, plan: &LevelPlan, seed: u64) -> Result<HistoryCurve> {
        match *self {
            Policy::Full | Policy::Covariance | Policy::Sum => full::compute(history, plan),
            Policy::Choice { .. } => choice::compute(history, plan, seed),
            Policy::Skip { corr_time } => skip::compute(history, plan, corr_time),
            Policy::Mca { .. } => mca::compute(history, plan),
        }
    }

    /// Statistics of two synchronised histories and their cross-covariance
    pub fn compute_pair(
        &self,
        first: &History,
        second: &History,
        plan: &LevelPlan,
    ) -> Result<PairCurve> {
        covariance::compute(first, second, plan)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mode())?;
        for (name, value) in self.parameters() {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}
