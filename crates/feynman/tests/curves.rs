//! Integration tests for the grouping policies on synthetic Poisson traces

use nkinetics_feynman::{
    analyse, partition, CurveSet, Error, McaMethod, Mode, Policy, RawTrace, RunConfig,
};
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use rand_pcg::Pcg64;
use rstest::{fixture, rstest};

/// Uncorrelated counts with a fixed seed
fn poisson_trace(detector: &str, rate: f64, length: usize, seed: u64) -> RawTrace {
    let mut rng = Pcg64::seed_from_u64(seed);
    let poisson = Poisson::new(rate).unwrap();
    let counts = (0..length)
        .map(|_| poisson.sample(&mut rng) as u32)
        .collect();
    RawTrace::new(detector, 1.0e-3, counts).unwrap()
}

#[fixture]
fn short_trace() -> RawTrace {
    poisson_trace("ch1", 5.0, 1000, 2024)
}

#[fixture]
fn long_trace() -> RawTrace {
    poisson_trace("ch1", 5.0, 200_000, 7)
}

fn single(sets: Vec<CurveSet>) -> CurveSet {
    assert_eq!(sets.len(), 1);
    sets.into_iter().next().unwrap()
}

#[test]
fn end_to_end_poisson() {
    let trace = poisson_trace("ch1", 5.0, 1000, 238);
    let config = RunConfig::new(Mode::Full, 10, 5.0e-3).disable_progress();
    let set = single(analyse(&[trace], &config).unwrap());

    assert_eq!(set.n_histories(), 10);
    assert_eq!(set.plan.m_points(), vec![100, 50, 33, 25, 20]);
    assert!(set.plan.m_points().windows(2).all(|w| w[0] > w[1]));
    assert_eq!(set.substitutions(), 0);

    // every history at every level, not only the mean
    for curve in &set.histories {
        assert_eq!(curve.values.len(), 5);
        for (level, y) in curve.values.iter().enumerate() {
            assert!(y.abs() < 0.5, "history {} level {}: Y = {y}", curve.index, level + 1);
        }
    }
    assert!(set.aggregate.mean.iter().all(|y| y.abs() < 0.5));
}

#[test]
fn huge_parameters_do_not_overflow() {
    let trace = poisson_trace("ch1", 5.0, 1000, 11);

    let skip = RunConfig::new(Mode::Skip, 10, 5.0e-3)
        .with_corr_time(1.0e20)
        .disable_progress();
    let set = single(analyse(std::slice::from_ref(&trace), &skip).unwrap());
    assert_eq!(set.plan.m_points(), vec![1; 5]);

    let mca = RunConfig::new(Mode::Mca, 10, 5.0e-3)
        .with_skip_mca(usize::MAX)
        .with_method_mca(McaMethod::AOverK)
        .disable_progress();
    let set = single(analyse(&[trace], &mca).unwrap());
    assert_eq!(set.plan.m_points(), vec![100]);
}

#[rstest]
fn full_policy_converges_to_zero(long_trace: RawTrace) {
    let config = RunConfig::new(Mode::Full, 10, 3.0e-3).disable_progress();
    let set = single(analyse(&[long_trace], &config).unwrap());

    for (y, err) in set.aggregate.mean.iter().zip(&set.aggregate.std_error) {
        assert!(y.abs() < 0.05, "Y = {y}");
        assert!(*err < 0.05, "std error = {err}");
    }
}

#[rstest]
#[case(0, McaMethod::Constant)] // case 1
#[case(1, McaMethod::Constant)] // case 2
#[case(0, McaMethod::AOverK)] // case 3
#[case(2, McaMethod::AOverK)] // case 4
fn mca_levels_use_disjoint_samples(#[case] skip: usize, #[case] method: McaMethod) {
    let policy = Policy::Mca { skip, method };
    let plan = policy.plan(1000, 7, 1.0e-3).unwrap();

    let spans: Vec<_> = plan
        .levels
        .iter()
        .map(|l| l.span.clone().unwrap())
        .collect();

    for (level, span) in plan.levels.iter().zip(&spans) {
        assert_eq!(span.len(), level.windows * level.level);
        assert!(span.end <= plan.samples_per_history);
    }

    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            assert!(a.end <= b.start || b.end <= a.start, "{a:?} overlaps {b:?}");
        }
    }
}

#[rstest]
fn covariance_of_identical_channels(short_trace: RawTrace) {
    let copy = RawTrace::new("ch2", short_trace.dt_base(), short_trace.counts().to_vec()).unwrap();
    let config = RunConfig::new(Mode::Covariance, 10, 5.0e-3).disable_progress();
    let sets = analyse(&[short_trace, copy], &config).unwrap();

    assert_eq!(sets.len(), 3);
    assert_eq!(sets[2].label, "ch1xch2");
    assert_eq!(sets[0].histories, sets[1].histories);

    // cross term reduces to Var / Mean of either channel
    for (channel, cross) in sets[0].histories.iter().zip(&sets[2].histories) {
        for (y, c) in channel.values.iter().zip(&cross.values) {
            assert!((c - (y + 1.0)).abs() < 1e-12);
        }
    }
}

#[rstest]
fn choice_of_every_window_matches_full(short_trace: RawTrace) {
    let full = RunConfig::new(Mode::Full, 10, 5.0e-3).disable_progress();
    let choice = RunConfig::new(Mode::Choice, 10, 5.0e-3)
        .with_fraction(1.0)
        .with_seed(3)
        .disable_progress();

    let traces = [short_trace];
    let full = single(analyse(&traces, &full).unwrap());
    let choice = single(analyse(&traces, &choice).unwrap());

    assert_eq!(full.plan.m_points(), choice.plan.m_points());
    for (a, b) in full.aggregate.mean.iter().zip(&choice.aggregate.mean) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[rstest]
fn skip_without_correlation_time_matches_full(short_trace: RawTrace) {
    let full = RunConfig::new(Mode::Full, 10, 5.0e-3).disable_progress();
    let skip = RunConfig::new(Mode::Skip, 10, 5.0e-3)
        .with_corr_time(0.0)
        .disable_progress();

    let traces = [short_trace];
    let full = single(analyse(&traces, &full).unwrap());
    let skip = single(analyse(&traces, &skip).unwrap());

    assert_eq!(full.histories, skip.histories);
}

#[rstest]
fn skip_thins_windows(short_trace: RawTrace) {
    let config = RunConfig::new(Mode::Skip, 10, 5.0e-3)
        .with_corr_time(2.0e-3)
        .disable_progress();
    let set = single(analyse(&[short_trace], &config).unwrap());

    // strides of 3, 2, 2, 2, 2 windows
    assert_eq!(set.plan.m_points(), vec![34, 25, 17, 13, 10]);
}

#[test]
fn sum_mode_matches_full_on_summed_counts() {
    let a = poisson_trace("a", 2.0, 1200, 1);
    let b = poisson_trace("b", 3.0, 1000, 2);

    let summed: Vec<u32> = a.counts().iter().zip(b.counts()).map(|(x, y)| x + y).collect();
    let reference = RawTrace::new("a+b", 1.0e-3, summed).unwrap();

    let sum = RunConfig::new(Mode::Sum, 5, 4.0e-3).disable_progress();
    let full = RunConfig::new(Mode::Full, 5, 4.0e-3).disable_progress();

    let sum = single(analyse(&[a, b], &sum).unwrap());
    let full = single(analyse(&[reference], &full).unwrap());

    assert_eq!(sum.label, "a+b");
    assert_eq!(sum.histories, full.histories);
}

#[rstest]
#[case(RunConfig::new(Mode::Choice, 10, 5.0e-3), "fraction")] // case 1
#[case(RunConfig::new(Mode::Skip, 10, 5.0e-3), "corr_time")] // case 2
#[case(RunConfig::new(Mode::Mca, 10, 5.0e-3), "skip_mca")] // case 3
#[case(RunConfig::new(Mode::Mca, 10, 5.0e-3).with_skip_mca(0), "method_mca")] // case 4
fn missing_parameters_fail_first(#[case] config: RunConfig, #[case] name: &str) {
    // an empty trace list would also fail, after the parameters are checked
    match analyse(&[], &config.disable_progress()) {
        Err(Error::MissingParameter { name: missing, .. }) => assert_eq!(missing, name),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn mca_history_too_short() {
    // 20 samples per history cannot give 6 levels of A/i windows
    let trace = poisson_trace("ch1", 5.0, 200, 9);
    let config = RunConfig::new(Mode::Mca, 10, 6.0e-3)
        .with_skip_mca(0)
        .with_method_mca(McaMethod::AOverK)
        .disable_progress();

    assert!(matches!(
        analyse(&[trace], &config),
        Err(Error::InsufficientHistoryLength { level: 6, .. })
    ));
}

#[test]
fn histories_partition_the_trace() {
    let trace = poisson_trace("ch1", 1.0, 10_007, 5);
    let split = partition(trace.counts(), 13, trace.dt_base(), 2.0e-3).unwrap();

    let total: usize = split.histories.iter().map(|h| h.len()).sum();
    assert_eq!(total, 13 * (10_007 / 13));
    assert!(split.histories.iter().all(|h| h.len() == split.samples_per_history));
}
