//! Parsers and logic for reading result files back in
//!
//! Reads the `.dat`, `.fey` and `.Nk` outputs produced by the
//! [writer](crate::writer) functions. This allows results to be checked
//! against the values that were computed, or picked up by downstream tools
//! without re-running the analysis.
//!
//! ```rust, no_run
//! # use nkinetics_feynman::{read_aggregate, read_mpoints};
//! let curve = read_aggregate("out/run042.ch1.fey").unwrap();
//! let mpoints = read_mpoints("out/run042.ch1.Nk").unwrap();
//!
//! println!("mode {}", curve.header.require("mode").unwrap());
//! for (tau, windows) in mpoints.tau.iter().zip(&mpoints.windows) {
//!     println!("{tau:e} {windows}");
//! }
//! ```
//!
//! Files are read line-by-line. Header lines start with `#` and hold
//! `key : value` pairs, everything else is a row of numbers with one value
//! per entry in the `columns` header.

pub mod parsers;

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// crate modules
use crate::aggregate::CountRate;
use crate::config::Mode;
use crate::error::{Error, Result};

// nkinetics modules
use nkinetics_utils::f;

// external crates
use log::trace;

/// Ordered `key : value` entries from a result file header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Entries in the order they were read
    pub entries: Vec<(String, String)>,
}

impl Header {
    /// Value for a key, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for a key, failing if it is not present
    pub fn require(&self, key: &'static str) -> Result<&str> {
        self.get(key).ok_or(Error::MissingHeader(key))
    }

    /// Calculation mode the file was produced with
    pub fn mode(&self) -> Result<Mode> {
        self.require("mode")?.parse()
    }

    /// Base sampling interval (s)
    pub fn dt_base(&self) -> Result<f64> {
        parse_value("dt_base", self.require("dt_base")?)
    }

    /// Number of histories aggregated
    pub fn n_histories(&self) -> Result<usize> {
        parse_value("histories", self.require("histories")?)
    }

    /// Names of the data columns
    pub fn columns(&self) -> Result<Vec<&str>> {
        Ok(self.require("columns")?.split_whitespace().collect())
    }

    /// Every `rate[<detector>]` entry, in order
    pub fn count_rates(&self) -> Result<Vec<(String, CountRate)>> {
        self.entries
            .iter()
            .filter_map(|(k, v)| {
                let detector = k.strip_prefix("rate[")?.strip_suffix(']')?;
                Some((detector, v))
            })
            .map(|(detector, v)| -> Result<(String, CountRate)> {
                let (_, (mean, std_error)) = parsers::value_with_error(v)
                    .map_err(|e| Error::ParseError(f!("count rate \"{v}\": {e}")))?;
                Ok((detector.to_string(), CountRate { mean, std_error }))
            })
            .collect()
    }
}

/// Curves of every history from a `.dat` file
#[derive(Debug, Clone, PartialEq)]
pub struct HistoriesFile {
    /// Header entries
    pub header: Header,
    /// Gate widths (s)
    pub tau: Vec<f64>,
    /// One curve per history, each with one value per `tau`
    pub histories: Vec<Vec<f64>>,
}

/// Aggregate curve from a `.fey` file
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFile {
    /// Header entries
    pub header: Header,
    /// Gate widths (s)
    pub tau: Vec<f64>,
    /// Mean over histories
    pub mean: Vec<f64>,
    /// Standard error of the mean
    pub std_error: Vec<f64>,
}

/// Windows per level from a `.Nk` file
#[derive(Debug, Clone, PartialEq)]
pub struct MPointsFile {
    /// Header entries
    pub header: Header,
    /// Grouping levels
    pub levels: Vec<usize>,
    /// Gate widths (s)
    pub tau: Vec<f64>,
    /// Number of windows `M_i`
    pub windows: Vec<usize>,
}

/// Read the per-history curves written by [write_histories()](crate::write_histories)
pub fn read_histories<P: AsRef<Path>>(path: P) -> Result<HistoriesFile> {
    let (header, columns) = read_table(path)?;
    let mut columns = columns.into_iter();

    let tau = columns
        .next()
        .ok_or_else(|| Error::ParseError("no tau column".to_string()))?;

    Ok(HistoriesFile {
        header,
        tau,
        histories: columns.collect(),
    })
}

/// Read the aggregate curve written by [write_aggregate()](crate::write_aggregate)
pub fn read_aggregate<P: AsRef<Path>>(path: P) -> Result<AggregateFile> {
    let (header, columns) = read_table(path)?;
    let [tau, mean, std_error] = exact_columns(columns)?;

    Ok(AggregateFile {
        header,
        tau,
        mean,
        std_error,
    })
}

/// Read the window counts written by [write_mpoints()](crate::write_mpoints)
pub fn read_mpoints<P: AsRef<Path>>(path: P) -> Result<MPointsFile> {
    let (header, columns) = read_table(path)?;
    let [levels, tau, windows] = exact_columns(columns)?;

    Ok(MPointsFile {
        header,
        levels: to_counts(&levels)?,
        tau,
        windows: to_counts(&windows)?,
    })
}

/// Parse the header and column-major data of any result file
fn read_table<P: AsRef<Path>>(path: P) -> Result<(Header, Vec<Vec<f64>>)> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut header = Header::default();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;

        if parsers::is_blank(&line) {
            continue;
        }

        if parsers::is_header(&line) {
            match parsers::header_entry(line.trim_start()) {
                Ok((_, (key, value))) => header.entries.push((key.into(), value.into())),
                Err(_) => trace!("Skipping comment on line {}", number + 1),
            }
            continue;
        }

        let (_, row) = parsers::number_row(&line)
            .map_err(|e| Error::ParseError(f!("line {}: {e}", number + 1)))?;
        rows.push(row);
    }

    let n_columns = header.columns()?.len();
    let mut columns = vec![Vec::with_capacity(rows.len()); n_columns];
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != n_columns {
            return Err(Error::ParseError(f!(
                "data row {} has {} values, expected {n_columns}",
                i + 1,
                row.len()
            )));
        }
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    Ok((header, columns))
}

fn exact_columns<const N: usize>(columns: Vec<Vec<f64>>) -> Result<[Vec<f64>; N]> {
    let found = columns.len();
    columns.try_into().map_err(|_| {
        Error::ParseError(f!("expected {N} columns, found {found}"))
    })
}

fn to_counts(values: &[f64]) -> Result<Vec<usize>> {
    values
        .iter()
        .map(|&v| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(Error::ParseError(f!("{v} is not a whole number")))
            }
        })
        .collect()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::ParseError(f!("invalid value for {key}: \"{value}\"")))
}
