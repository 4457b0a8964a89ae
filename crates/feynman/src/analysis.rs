//! End-to-end processing of raw traces into Feynman-alpha curves

// standard library
use std::path::PathBuf;

// crate modules
use crate::aggregate::{aggregate, count_rate, AggregateCurve, CountRate};
use crate::config::{Mode, RunConfig};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::kernel::{HistoryCurve, LevelPlan};
use crate::partition::{partition, Partition};
use crate::policy::Policy;
use crate::runner::Runner;
use crate::trace::{check_common_time_step, common_length, sum_traces, RawTrace};
use crate::writer::write_results;

// nkinetics modules
use nkinetics_utils::f;

// external crates
use itertools::multiunzip;
use log::{info, warn};
use rand::Rng;

/// Every result for one curve, ready to be written
///
/// A run produces one [CurveSet] per detector for single-channel policies,
/// one for the summed trace, or three for the covariance policy (both
/// channels and their cross term).
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSet {
    /// Detector identifier, or combined identifier for multi-channel modes
    pub label: String,
    /// Policy used, including its parameters
    pub policy: Policy,
    /// Levels, gate widths and window counts
    pub plan: LevelPlan,
    /// Largest requested gate width (s)
    pub dt_max: f64,
    /// Curve of every history, in history order
    pub histories: Vec<HistoryCurve>,
    /// Mean and standard error over histories
    pub aggregate: AggregateCurve,
    /// Count rate of every contributing detector
    pub count_rates: Vec<(String, CountRate)>,
    /// Seed used for random window selection
    pub seed: Option<u64>,
}

impl CurveSet {
    /// Calculation mode of the policy
    pub fn mode(&self) -> Mode {
        self.policy.mode()
    }

    /// Number of histories aggregated
    pub fn n_histories(&self) -> usize {
        self.histories.len()
    }

    /// Total number of zero-mean substitutions over every history
    pub fn substitutions(&self) -> usize {
        self.histories.iter().map(|h| h.substituted.len()).sum()
    }
}

/// Process raw traces with the policy and parameters of a run
///
/// All configuration and data sufficiency checks happen before any history
/// is processed. Single-channel policies are applied to every trace
/// independently.
///
/// ```rust
/// # use nkinetics_feynman::{analyse, Mode, RawTrace, RunConfig};
/// let counts: Vec<u32> = (0..1000).map(|i| (i * 7 % 11) as u32).collect();
/// let trace = RawTrace::new("ch1", 1.0e-3, counts).unwrap();
/// let config = RunConfig::new(Mode::Full, 10, 5.0e-3).disable_progress();
///
/// let sets = analyse(&[trace], &config).unwrap();
/// assert_eq!(sets.len(), 1);
/// assert_eq!(sets[0].plan.m_points(), vec![100, 50, 33, 25, 20]);
/// assert_eq!(sets[0].aggregate.len(), 5);
/// ```
pub fn analyse(traces: &[RawTrace], config: &RunConfig) -> Result<Vec<CurveSet>> {
    let policy = Policy::from_config(config)?;
    preflight(traces, config, &policy)?;

    let runner = Runner::from_config(config)?;
    let seed = run_seed(&policy, config);

    info!(
        "Processing {} trace(s) with {policy}, {} histories, dt_max = {}",
        traces.len(),
        config.n_histories,
        config.dt_max
    );

    let sets = match policy {
        Policy::Covariance => analyse_covariance(traces, config, &policy, &runner)?,
        Policy::Sum => {
            let summed = sum_traces(traces)?;
            let mut count_rates = labelled_rates(traces)?;
            count_rates.push((summed.detector().to_string(), count_rate(&summed)?));

            let job = Job::prepare(&summed, config, &policy)?;
            vec![job.run(&runner, &policy, config, seed, count_rates)?]
        }
        _ => {
            // every trace is checked before anything runs
            let jobs = traces
                .iter()
                .map(|trace| Job::prepare(trace, config, &policy))
                .collect::<Result<Vec<Job>>>()?;

            jobs.into_iter()
                .map(|job| {
                    let count_rates = labelled_rates(std::slice::from_ref(job.trace))?;
                    job.run(&runner, &policy, config, seed, count_rates)
                })
                .collect::<Result<Vec<CurveSet>>>()?
        }
    };

    for set in sets.iter().filter(|s| s.substitutions() > 0) {
        warn!(
            "{}: {} zero mean substitution(s) across {} histories",
            set.label,
            set.substitutions(),
            set.n_histories()
        );
    }

    Ok(sets)
}

/// Process a complete run and write every output file
///
/// Traces are first labelled with the detector identifiers of the context
/// (see [RunContext::label_traces()]), so the names taken from the input
/// files label every curve set, output file name and header. Returns the
/// paths written.
///
/// ```no_run
/// # use nkinetics_feynman::{process_run, Mode, RawTrace, RunConfig, RunContext};
/// let counts: Vec<u32> = (0..1000).map(|i| (i % 9) as u32).collect();
/// let trace = RawTrace::new("", 1.0e-3, counts).unwrap();
/// let config = RunConfig::new(Mode::Full, 10, 5.0e-3);
///
/// let context = RunContext::from_paths(&["data/run042_ch1.bin"], "out");
/// let paths = process_run(vec![trace], &config, &context).unwrap();
///
/// assert!(paths[0].ends_with("run042.ch1.dat"));
/// ```
pub fn process_run(
    traces: Vec<RawTrace>,
    config: &RunConfig,
    context: &RunContext,
) -> Result<Vec<PathBuf>> {
    let traces = context.label_traces(traces)?;
    let sets = analyse(&traces, config)?;
    write_results(&sets, context)
}

/// Checks that do not need any data to be partitioned
fn preflight(traces: &[RawTrace], config: &RunConfig, policy: &Policy) -> Result<()> {
    if traces.is_empty() {
        return Err(Error::NoTraces);
    }

    if policy.mode() == Mode::Covariance && traces.len() < 2 {
        return Err(Error::TooFewTraces {
            mode: Mode::Covariance,
            required: 2,
            found: traces.len(),
        });
    }

    if config.n_histories < 2 {
        return Err(Error::InsufficientHistories {
            required: 2,
            found: config.n_histories,
        });
    }

    Ok(())
}

/// Seed for random policies, drawn from entropy if not configured
fn run_seed(policy: &Policy, config: &RunConfig) -> Option<u64> {
    if !policy.is_random() {
        return None;
    }
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    info!("Random window selection seeded with {seed}");
    Some(seed)
}

fn labelled_rates(traces: &[RawTrace]) -> Result<Vec<(String, CountRate)>> {
    traces
        .iter()
        .map(|t| -> Result<(String, CountRate)> {
            Ok((t.detector().to_string(), count_rate(t)?))
        })
        .collect()
}

/// A partitioned trace and its level plan
struct Job<'a> {
    trace: &'a RawTrace,
    partition: Partition<'a>,
    plan: LevelPlan,
}

impl<'a> Job<'a> {
    fn prepare(trace: &'a RawTrace, config: &RunConfig, policy: &Policy) -> Result<Self> {
        let partition = partition(
            trace.counts(),
            config.n_histories,
            trace.dt_base(),
            config.dt_max,
        )?;
        let plan = policy.plan(
            partition.samples_per_history,
            partition.max_levels,
            trace.dt_base(),
        )?;
        Ok(Self {
            trace,
            partition,
            plan,
        })
    }

    fn run(
        self,
        runner: &Runner,
        policy: &Policy,
        config: &RunConfig,
        seed: Option<u64>,
        count_rates: Vec<(String, CountRate)>,
    ) -> Result<CurveSet> {
        let histories = runner.run(
            &self.partition.histories,
            policy,
            &self.plan,
            seed.unwrap_or_default(),
        )?;
        let aggregate = aggregate(&histories)?;

        info!(
            "{}: {} levels over {} histories",
            self.trace.detector(),
            self.plan.len(),
            histories.len()
        );

        Ok(CurveSet {
            label: self.trace.detector().to_string(),
            policy: *policy,
            plan: self.plan,
            dt_max: config.dt_max,
            histories,
            aggregate,
            count_rates,
            seed,
        })
    }
}

/// Two synchronised channels, producing three curve sets
fn analyse_covariance(
    traces: &[RawTrace],
    config: &RunConfig,
    policy: &Policy,
    runner: &Runner,
) -> Result<Vec<CurveSet>> {
    if traces.len() > 2 {
        warn!(
            "Covariance uses the first two traces, ignoring {} more",
            traces.len() - 2
        );
    }

    let pair = &traces[..2];
    check_common_time_step(pair)?;
    let length = common_length(pair);
    let first = pair[0].truncated(length);
    let second = pair[1].truncated(length);

    let job_first = Job::prepare(&first, config, policy)?;
    let job_second = Job::prepare(&second, config, policy)?;
    let count_rates = labelled_rates(pair)?;

    let curves = runner.run_pairs(
        &job_first.partition.histories,
        &job_second.partition.histories,
        policy,
        &job_first.plan,
    )?;

    let (first_curves, second_curves, cross_curves): (Vec<_>, Vec<_>, Vec<_>) =
        multiunzip(curves.into_iter().map(|p| (p.first, p.second, p.cross)));

    let labels = [
        first.detector().to_string(),
        second.detector().to_string(),
        f!("{}x{}", first.detector(), second.detector()),
    ];

    let mut sets = Vec::with_capacity(3);
    for (label, histories) in labels.into_iter().zip([first_curves, second_curves, cross_curves]) {
        let aggregate = aggregate(&histories)?;
        sets.push(CurveSet {
            label,
            policy: *policy,
            plan: job_first.plan.clone(),
            dt_max: config.dt_max,
            histories,
            aggregate,
            count_rates: count_rates.clone(),
            seed: None,
        });
    }

    info!(
        "{}: {} levels over {} history pairs",
        sets[2].label,
        job_first.plan.len(),
        sets[2].n_histories()
    );

    Ok(sets)
}
