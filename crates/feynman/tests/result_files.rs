//! Integration tests for writing and reading result files

use std::path::PathBuf;

use nkinetics_feynman::{
    analyse, process_run, read_aggregate, read_histories, read_mpoints, write_results, CurveSet,
    Error, McaMethod, Mode, RawTrace, RunConfig, RunContext,
};
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use rand_pcg::Pcg64;
use rstest::{fixture, rstest};

#[fixture]
fn traces() -> Vec<RawTrace> {
    let mut rng = Pcg64::seed_from_u64(42);
    let poisson = Poisson::new(4.0).unwrap();
    ["ch1", "ch2"]
        .iter()
        .map(|detector| {
            let counts = (0..2000).map(|_| poisson.sample(&mut rng) as u32).collect();
            RawTrace::new(*detector, 1.0e-3, counts).unwrap()
        })
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-15 * a.abs().max(b.abs()).max(1.0)
}

fn check_round_trip(set: &CurveSet, paths: &[PathBuf]) {
    let histories = read_histories(&paths[0]).unwrap();
    let aggregate = read_aggregate(&paths[1]).unwrap();
    let mpoints = read_mpoints(&paths[2]).unwrap();

    assert_eq!(histories.histories.len(), set.n_histories());
    for (read, curve) in histories.histories.iter().zip(&set.histories) {
        assert!(read.iter().zip(&curve.values).all(|(a, b)| close(*a, *b)));
    }

    assert!(aggregate
        .mean
        .iter()
        .zip(&set.aggregate.mean)
        .all(|(a, b)| close(*a, *b)));
    assert!(aggregate
        .std_error
        .iter()
        .zip(&set.aggregate.std_error)
        .all(|(a, b)| close(*a, *b)));

    assert_eq!(mpoints.windows, set.plan.m_points());
    assert_eq!(mpoints.levels.len(), set.plan.len());
    assert!(mpoints.tau.iter().zip(set.plan.taus()).all(|(a, b)| close(*a, b)));

    assert_eq!(aggregate.header.mode().unwrap(), set.mode());
    assert_eq!(aggregate.header.n_histories().unwrap(), set.n_histories());
    assert_eq!(aggregate.header.require("label").unwrap(), set.label);
    assert_eq!(
        aggregate.header.count_rates().unwrap().len(),
        set.count_rates.len()
    );
}

#[rstest]
#[case(RunConfig::new(Mode::Full, 8, 4.0e-3), 2)] // case 1
#[case(RunConfig::new(Mode::Choice, 8, 4.0e-3).with_fraction(0.6).with_seed(5), 2)] // case 2
#[case(RunConfig::new(Mode::Skip, 8, 4.0e-3).with_corr_time(1.0e-3), 2)] // case 3
#[case(RunConfig::new(Mode::Mca, 8, 4.0e-3).with_skip_mca(1).with_method_mca(McaMethod::Constant), 2)] // case 4
#[case(RunConfig::new(Mode::Covariance, 8, 4.0e-3), 3)] // case 5
#[case(RunConfig::new(Mode::Sum, 8, 4.0e-3), 1)] // case 6
fn write_then_read(traces: Vec<RawTrace>, #[case] config: RunConfig, #[case] n_sets: usize) {
    let dir = tempfile::tempdir().unwrap();
    let config = config.with_output_dir(dir.path()).disable_progress();

    let sets = analyse(&traces, &config).unwrap();
    assert_eq!(sets.len(), n_sets);

    let context = RunContext::from_paths(&["run7_ch1.bin", "run7_ch2.bin"], &config.output_dir);
    let paths = write_results(&sets, &context).unwrap();
    assert_eq!(paths.len(), 3 * n_sets);

    for (set, paths) in sets.iter().zip(paths.chunks(3)) {
        check_round_trip(set, paths);
    }
}

#[rstest]
fn output_names_follow_mode(traces: Vec<RawTrace>) {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::new(Mode::Covariance, 8, 4.0e-3)
        .with_output_dir(dir.path())
        .disable_progress();

    let sets = analyse(&traces, &config).unwrap();
    let context = RunContext::from_paths(&["run7_ch1.bin", "run7_ch2.bin"], dir.path());
    let paths = write_results(&sets, &context).unwrap();

    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(
        names,
        vec![
            "run7.ch1_cov.dat",
            "run7.ch1_cov.fey",
            "run7.ch1_cov.Nk",
            "run7.ch2_cov.dat",
            "run7.ch2_cov.fey",
            "run7.ch2_cov.Nk",
            "run7.ch1xch2_cov.dat",
            "run7.ch1xch2_cov.fey",
            "run7.ch1xch2_cov.Nk",
        ]
    );
}

#[test]
fn seed_is_written_for_choice() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = Pcg64::seed_from_u64(1);
    let poisson = Poisson::new(3.0).unwrap();
    let counts = (0..500).map(|_| poisson.sample(&mut rng) as u32).collect();
    let trace = RawTrace::new("det", 1.0e-3, counts).unwrap();

    // no seed configured, so one is drawn and recorded
    let config = RunConfig::new(Mode::Choice, 5, 3.0e-3)
        .with_fraction(0.5)
        .disable_progress();
    let sets = analyse(&[trace], &config).unwrap();
    let seed = sets[0].seed.unwrap();

    let context = RunContext::new("run", dir.path()).with_detectors(&["det"]);
    let paths = write_results(&sets, &context).unwrap();
    let aggregate = read_aggregate(&paths[1]).unwrap();

    assert_eq!(aggregate.header.require("seed").unwrap(), seed.to_string());
    assert_eq!(aggregate.header.require("fraction").unwrap(), "0.5");
    assert!(paths[1].ends_with("run.det_choice.fey"));
}

#[rstest]
fn file_names_label_the_outputs(traces: Vec<RawTrace>) {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::new(Mode::Sum, 8, 4.0e-3).disable_progress();

    // traces are built as ch1 and ch2, the files say otherwise
    let context = RunContext::from_paths(
        &["/data/shot12_north.bin", "/data/shot12_south.bin"],
        dir.path(),
    );
    let paths = process_run(traces, &config, &context).unwrap();

    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "shot12.north+south_sum.dat",
            "shot12.north+south_sum.fey",
            "shot12.north+south_sum.Nk",
        ]
    );

    let aggregate = read_aggregate(&paths[1]).unwrap();
    let detectors: Vec<String> = aggregate
        .header
        .count_rates()
        .unwrap()
        .into_iter()
        .map(|(detector, _)| detector)
        .collect();
    assert_eq!(detectors, vec!["north", "south", "north+south"]);
}

#[rstest]
fn file_count_must_match_traces(traces: Vec<RawTrace>) {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::new(Mode::Full, 8, 4.0e-3).disable_progress();
    let context = RunContext::from_paths(&["shot12_north.bin"], dir.path());

    assert!(matches!(
        process_run(traces, &config, &context),
        Err(Error::DetectorCountMismatch {
            detectors: 1,
            traces: 2
        })
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
