//! Naming metadata carried through a processing run

// standard library
use std::path::{Path, PathBuf};

// crate modules
use crate::config::Mode;
use crate::error::{Error, Result};
use crate::trace::RawTrace;

// nkinetics modules
use nkinetics_utils::f;

// external crates
use chrono::{DateTime, Utc};

/// Everything needed to name and label the outputs of one run
///
/// Input file names are parsed once, up front, and the results are threaded
/// through to the writer. Nothing is rediscovered from disk later.
///
/// Output files follow `<basename>.<label>[_<suffix>].<extension>`, for
/// example:
///
/// ```rust
/// # use nkinetics_feynman::{Mode, RunContext};
/// let context = RunContext::from_paths(&["data/run042_ch1.bin", "data/run042_ch2.bin"], "out");
/// assert_eq!(context.basename, "run042");
/// assert_eq!(context.detectors, vec!["ch1", "ch2"]);
///
/// let path = context.output_path("ch1", Mode::Choice, "fey");
/// assert_eq!(path, std::path::Path::new("out/run042.ch1_choice.fey"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Common stem for every output file
    pub basename: String,
    /// Detector identifiers in input order
    pub detectors: Vec<String>,
    /// Directory that outputs are written to
    pub output_dir: PathBuf,
    /// Time the run was started
    pub timestamp: DateTime<Utc>,
}

impl RunContext {
    /// Context with an explicit basename and no known detectors
    pub fn new<S: Into<String>, P: AsRef<Path>>(basename: S, output_dir: P) -> Self {
        Self {
            basename: basename.into(),
            detectors: Vec::new(),
            output_dir: output_dir.as_ref().to_path_buf(),
            timestamp: Utc::now(),
        }
    }

    /// Derive the basename and detector identifiers from input file names
    ///
    /// The basename is taken from the first file. See [split_file_stem()] for
    /// how each name is split.
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(paths: &[P], output_dir: Q) -> Self {
        let mut context = Self::new("", output_dir);
        for (i, path) in paths.iter().enumerate() {
            let (basename, detector) = split_file_stem(path);
            if i == 0 {
                context.basename = basename;
            }
            context.detectors.push(detector);
        }
        context
    }

    /// Set the detector identifiers explicitly
    pub fn with_detectors<S: AsRef<str>>(mut self, detectors: &[S]) -> Self {
        self.detectors = detectors.iter().map(|d| d.as_ref().to_string()).collect();
        self
    }

    /// Label traces with the detector identifiers of the run
    ///
    /// Identifiers are matched to traces in input order, so the names parsed
    /// from input files are the ones used for every output. A context with no
    /// detectors leaves the traces unchanged.
    ///
    /// ```rust
    /// # use nkinetics_feynman::{RawTrace, RunContext};
    /// let context = RunContext::from_paths(&["run7_det3.bin"], "out");
    /// let trace = RawTrace::new("unnamed", 1.0e-3, vec![1, 2, 3]).unwrap();
    ///
    /// let traces = context.label_traces(vec![trace]).unwrap();
    /// assert_eq!(traces[0].detector(), "det3");
    /// ```
    pub fn label_traces(&self, traces: Vec<RawTrace>) -> Result<Vec<RawTrace>> {
        if self.detectors.is_empty() {
            return Ok(traces);
        }

        if self.detectors.len() != traces.len() {
            return Err(Error::DetectorCountMismatch {
                detectors: self.detectors.len(),
                traces: traces.len(),
            });
        }

        Ok(traces
            .into_iter()
            .zip(&self.detectors)
            .map(|(trace, detector)| trace.with_detector(detector.as_str()))
            .collect())
    }

    /// Processing time as written to output headers
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    /// Full path for one output file
    pub fn output_path(&self, label: &str, mode: Mode, extension: &str) -> PathBuf {
        let name = match mode.suffix() {
            Some(suffix) => f!("{}.{label}_{suffix}.{extension}", self.basename),
            None => f!("{}.{label}.{extension}", self.basename),
        };
        self.output_dir.join(name)
    }
}

/// Split a file name into a basename and a detector identifier
///
/// The extension is dropped and the stem is split on the last `_` or `.`.
/// Names without a separator use the whole stem for both.
///
/// ```rust
/// # use nkinetics_feynman::split_file_stem;
/// assert_eq!(split_file_stem("run042_ch1.bin"), ("run042".into(), "ch1".into()));
/// assert_eq!(split_file_stem("/data/pulse.det3.dat"), ("pulse".into(), "det3".into()));
/// assert_eq!(split_file_stem("counts.txt"), ("counts".into(), "counts".into()));
/// ```
pub fn split_file_stem<P: AsRef<Path>>(path: P) -> (String, String) {
    let stem = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    match stem.rfind(['_', '.']) {
        Some(i) if i > 0 && i + 1 < stem.len() => {
            (stem[..i].to_string(), stem[i + 1..].to_string())
        }
        _ => (stem.clone(), stem),
    }
}
