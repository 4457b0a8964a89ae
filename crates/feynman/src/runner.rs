//! Parallel processing of independent histories
//!
//! Histories are independent, equal-length units of work, so the runner is a
//! plain parallel map over them on a rayon pool. Each task only reads its
//! history and the shared [LevelPlan]; nothing is mutated between tasks.
//!
//! Results are collected in history order. The first failing history aborts
//! the whole run, since aggregation assumes a complete set of curves.

// crate modules
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::kernel::{HistoryCurve, LevelPlan, PairCurve};
use crate::partition::History;
use crate::policy::Policy;

// external crates
use kdam::par_tqdm;
use log::debug;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Dispatches the grouping kernel across histories
///
/// By default work runs on the global rayon pool, which has one worker per
/// logical CPU. A dedicated pool with a fixed number of workers can be
/// requested instead.
///
/// ```rust
/// # use nkinetics_feynman::{partition, Policy, Runner};
/// let counts: Vec<u32> = (0..400).map(|i| (i % 7) as u32).collect();
/// let split = partition(&counts, 4, 1.0, 5.0).unwrap();
/// let plan = Policy::Full.plan(split.samples_per_history, split.max_levels, 1.0).unwrap();
///
/// let mut runner = Runner::with_threads(2).unwrap();
/// runner.disable_progress();
///
/// let curves = runner.run(&split.histories, &Policy::Full, &plan, 0).unwrap();
/// assert_eq!(curves.len(), 4);
/// assert_eq!(curves[3].index, 3);
/// ```
#[derive(Debug, Default)]
pub struct Runner {
    /// Dedicated pool, otherwise the rayon global pool
    pool: Option<ThreadPool>,
    /// Disable progress bar?
    disable_progress: bool,
}

impl Runner {
    /// Runner on the global pool
    pub fn new() -> Self {
        Default::default()
    }

    /// Runner on a dedicated pool of `threads` workers
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(Self {
            pool: Some(pool),
            disable_progress: false,
        })
    }

    /// Runner matching the `threads` and `progress` settings of a run
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let mut runner = match config.threads {
            Some(0) => {
                return Err(Error::InvalidParameter {
                    name: "threads",
                    value: "0".to_string(),
                    reason: "at least one worker is required",
                })
            }
            Some(threads) => Self::with_threads(threads)?,
            None => Self::new(),
        };

        if !config.progress {
            runner.disable_progress();
        }
        Ok(runner)
    }

    /// Do not print the kdam progress indicators
    pub fn disable_progress(&mut self) {
        self.disable_progress = true;
    }

    /// Number of workers available to the runner
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Apply a single-channel policy to every history
    pub fn run(
        &self,
        histories: &[History],
        policy: &Policy,
        plan: &LevelPlan,
        seed: u64,
    ) -> Result<Vec<HistoryCurve>> {
        debug!(
            "Running {policy} over {} histories on {} workers",
            histories.len(),
            self.threads()
        );

        self.install(|| {
            let tasks = histories
                .par_iter()
                .map(|history| policy.compute(history, plan, seed));

            if self.disable_progress {
                tasks.collect()
            } else {
                let curves: Result<Vec<HistoryCurve>> = par_tqdm!(
                    tasks,
                    bar_format = "Grouping histories: {count}/{total} [{rate:.2} hist/s]  "
                )
                .collect();
                eprintln!();
                curves
            }
        })
    }

    /// Apply the covariance policy to synchronised pairs of histories
    pub fn run_pairs(
        &self,
        first: &[History],
        second: &[History],
        policy: &Policy,
        plan: &LevelPlan,
    ) -> Result<Vec<PairCurve>> {
        if first.len() != second.len() {
            return Err(Error::LengthMismatch {
                expected: first.len(),
                found: second.len(),
            });
        }

        debug!(
            "Running {policy} over {} history pairs on {} workers",
            first.len(),
            self.threads()
        );

        self.install(|| {
            let tasks = first
                .par_iter()
                .zip(second.par_iter())
                .map(|(a, b)| policy.compute_pair(a, b, plan));

            if self.disable_progress {
                tasks.collect()
            } else {
                let curves: Result<Vec<PairCurve>> = par_tqdm!(
                    tasks,
                    bar_format = "Grouping pairs: {count}/{total} [{rate:.2} hist/s]  "
                )
                .collect();
                eprintln!();
                curves
            }
        })
    }

    /// Execute on the dedicated pool if there is one
    fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
