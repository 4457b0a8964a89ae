//! Write operations for Feynman-alpha results
//!
//! Every [CurveSet] is written to three text files:
//!
//! | Extension | Content                                         |
//! | --------- | ----------------------------------------------- |
//! | `.dat`    | `tau` followed by one column per history        |
//! | `.fey`    | `tau`, mean and standard error over histories   |
//! | `.Nk`     | `level`, `tau` and the number of windows `M_i`  |
//!
//! Each file starts with a `# key : value` header describing the run, and
//! the `columns` entry names the data columns. Values are written with 17
//! significant digits so that they parse back to the same `f64`.

// standard library
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// crate modules
use crate::analysis::CurveSet;
use crate::context::RunContext;
use crate::error::Result;

// nkinetics modules
use nkinetics_utils::{f, ValueExt};

// external crates
use itertools::Itertools;
use log::info;

/// Formatting used for every floating point value
fn sci(value: f64) -> String {
    value.sci(16, 2)
}

/// Write all three output files for every curve set
///
/// The output directory is created if it does not exist. Returns the paths
/// of every file written, in order.
///
/// ```no_run
/// # use nkinetics_feynman::{analyse, write_results, Mode, RawTrace, RunConfig, RunContext};
/// let counts: Vec<u32> = (0..1000).map(|i| (i % 9) as u32).collect();
/// let trace = RawTrace::new("ch1", 1.0e-3, counts).unwrap();
/// let config = RunConfig::new(Mode::Full, 10, 5.0e-3).with_output_dir("./out");
///
/// let sets = analyse(&[trace], &config).unwrap();
/// let context = RunContext::from_paths(&["run042_ch1.bin"], &config.output_dir);
///
/// // ./out/run042.ch1.dat, ./out/run042.ch1.fey, ./out/run042.ch1.Nk
/// let paths = write_results(&sets, &context).unwrap();
/// assert_eq!(paths.len(), 3);
/// ```
pub fn write_results(sets: &[CurveSet], context: &RunContext) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&context.output_dir)?;

    let mut paths = Vec::with_capacity(3 * sets.len());
    for set in sets {
        let mode = set.mode();

        let path = context.output_path(&set.label, mode, "dat");
        write_histories(set, context, &path)?;
        paths.push(path);

        let path = context.output_path(&set.label, mode, "fey");
        write_aggregate(set, context, &path)?;
        paths.push(path);

        let path = context.output_path(&set.label, mode, "Nk");
        write_mpoints(set, context, &path)?;
        paths.push(path);
    }

    for path in &paths {
        info!("Written {}", path.display());
    }

    Ok(paths)
}

/// Write the curve of every history as columns against `tau`
pub fn write_histories<P: AsRef<Path>>(set: &CurveSet, context: &RunContext, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;

    let columns = std::iter::once("tau".to_string())
        .chain(set.histories.iter().map(|h| f!("y{}", h.index)))
        .collect::<Vec<String>>();
    write_header(&mut writer, set, context, &columns)?;

    for (i, level) in set.plan.levels.iter().enumerate() {
        let row = std::iter::once(level.tau)
            .chain(set.histories.iter().map(|h| h.values[i]))
            .map(sci)
            .join(" ");
        writeln!(writer, "{row}")?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the mean and standard error against `tau`
pub fn write_aggregate<P: AsRef<Path>>(set: &CurveSet, context: &RunContext, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;

    let columns = ["tau", "mean", "std_error"].map(String::from);
    write_header(&mut writer, set, context, &columns)?;

    let taus = set.plan.taus();
    for ((tau, mean), err) in taus
        .iter()
        .zip(&set.aggregate.mean)
        .zip(&set.aggregate.std_error)
    {
        writeln!(writer, "{} {} {}", sci(*tau), sci(*mean), sci(*err))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the number of windows used at every level
pub fn write_mpoints<P: AsRef<Path>>(set: &CurveSet, context: &RunContext, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;

    let columns = ["level", "tau", "windows"].map(String::from);
    write_header(&mut writer, set, context, &columns)?;

    for level in &set.plan.levels {
        writeln!(writer, "{} {} {}", level.level, sci(level.tau), level.windows)?;
    }

    writer.flush()?;
    Ok(())
}

/// Common `# key : value` header for every output
fn write_header<W: Write>(
    writer: &mut W,
    set: &CurveSet,
    context: &RunContext,
    columns: &[String],
) -> Result<()> {
    writeln!(writer, "# timestamp : {}", context.timestamp_string())?;
    writeln!(writer, "# basename : {}", context.basename)?;
    writeln!(writer, "# label : {}", set.label)?;
    writeln!(writer, "# mode : {}", set.mode())?;
    for (name, value) in set.policy.parameters() {
        writeln!(writer, "# {name} : {value}")?;
    }
    if let Some(seed) = set.seed {
        writeln!(writer, "# seed : {seed}")?;
    }
    writeln!(writer, "# dt_base : {}", sci(set.plan.dt_base))?;
    writeln!(writer, "# dt_max : {}", sci(set.dt_max))?;
    writeln!(writer, "# histories : {}", set.n_histories())?;
    writeln!(writer, "# samples : {}", set.plan.samples_per_history)?;
    writeln!(writer, "# levels : {}", set.plan.len())?;
    writeln!(writer, "# substituted : {}", set.substitutions())?;
    for (detector, rate) in &set.count_rates {
        writeln!(
            writer,
            "# rate[{detector}] : {} +/- {}",
            sci(rate.mean),
            sci(rate.std_error)
        )?;
    }
    writeln!(writer, "# columns : {}", columns.join(" "))?;
    Ok(())
}

/// Initialise a writer from anything that can be turned into a path
fn init_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}
