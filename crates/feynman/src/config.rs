//! Run configuration and calculation modes

// standard library
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// crate modules
use crate::error::{Error, Result};

// external crates
use serde::{Deserialize, Serialize};

/// Calculation mode, i.e. how windows are selected from each history
///
/// Parsed from the usual mode strings (case-insensitive):
///
/// ```rust
/// # use nkinetics_feynman::Mode;
/// # use std::str::FromStr;
/// assert_eq!(Mode::from_str("full").unwrap(), Mode::Full);
/// assert_eq!(Mode::from_str("MCA").unwrap(), Mode::Mca);
/// assert!(Mode::from_str("feynman").is_err());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every disjoint window at every level
    #[default]
    Full,
    /// Random subset of windows per level, without replacement
    Choice,
    /// Every `(S+1)`-th window, spaced beyond a correlation time
    Skip,
    /// No base sample is reused between levels
    Mca,
    /// Two channels with normalised cross-covariance
    Covariance,
    /// All traces summed into one before the full policy
    Sum,
}

impl Mode {
    /// Lowercase identifier used in file headers and configuration
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Full => "full",
            Mode::Choice => "choice",
            Mode::Skip => "skip",
            Mode::Mca => "mca",
            Mode::Covariance => "covariance",
            Mode::Sum => "sum",
        }
    }

    /// File name suffix, `None` for the baseline full policy
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Mode::Full => None,
            Mode::Choice => Some("choice"),
            Mode::Skip => Some("skip"),
            Mode::Mca => Some("mca"),
            Mode::Covariance => Some("cov"),
            Mode::Sum => Some("sum"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Mode::Full),
            "choice" => Ok(Mode::Choice),
            "skip" => Ok(Mode::Skip),
            "mca" => Ok(Mode::Mca),
            "covariance" | "cov" => Ok(Mode::Covariance),
            "sum" => Ok(Mode::Sum),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the MCA policy shares a history between retained levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McaMethod {
    /// The same number of windows `M` at every retained level
    #[serde(rename = "constant")]
    Constant,
    /// `M_i = floor(A / i)`, i.e. the same number of base samples per level
    #[serde(rename = "A_over_k")]
    AOverK,
}

impl FromStr for McaMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "constant" => Ok(McaMethod::Constant),
            "a_over_k" => Ok(McaMethod::AOverK),
            _ => Err(Error::UnknownMcaMethod(s.to_string())),
        }
    }
}

impl fmt::Display for McaMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            McaMethod::Constant => write!(f, "constant"),
            McaMethod::AOverK => write!(f, "A_over_k"),
        }
    }
}

/// Mode-specific keyword parameters
///
/// Only the parameters relevant to the chosen [Mode] are required, see
/// [Policy::from_config()](crate::Policy::from_config) for validation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeParams {
    /// Fraction of windows kept by [Mode::Choice], 0 < fraction <= 1
    #[serde(default)]
    pub fraction: Option<f64>,
    /// Correlation time (s) to exceed between windows for [Mode::Skip]
    #[serde(default)]
    pub corr_time: Option<f64>,
    /// Number of consecutive levels skipped by [Mode::Mca]
    #[serde(default)]
    pub skip_mca: Option<usize>,
    /// Window allocation strategy for [Mode::Mca]
    #[serde(default)]
    pub method_mca: Option<McaMethod>,
}

/// Full set of parameters for one processing run
///
/// Usually built in code:
///
/// ```rust
/// # use nkinetics_feynman::{Mode, RunConfig};
/// let config = RunConfig::new(Mode::Choice, 10, 5.0e-3)
///     .with_fraction(0.5)
///     .with_seed(42);
/// assert_eq!(config.params.fraction, Some(0.5));
/// ```
///
/// or read from a JSON file with [RunConfig::from_json_file()]:
///
/// ```json
/// {
///     "n_histories": 10,
///     "dt_max": 0.005,
///     "mode": "mca",
///     "skip_mca": 1,
///     "method_mca": "A_over_k",
///     "output_dir": "results"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of independent histories each trace is split into
    pub n_histories: usize,
    /// Largest synthesised gate width (s)
    pub dt_max: f64,
    /// Calculation mode
    pub mode: Mode,
    /// Mode-specific parameters
    #[serde(flatten)]
    pub params: ModeParams,
    /// Seed for random window selection, drawn from entropy if missing
    #[serde(default)]
    pub seed: Option<u64>,
    /// Worker threads, defaults to one per logical CPU
    #[serde(default)]
    pub threads: Option<usize>,
    /// Show a progress bar while histories are processed
    #[serde(default = "default_progress")]
    pub progress: bool,
    /// Directory for result files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_progress() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl RunConfig {
    /// New configuration with no mode-specific parameters set
    pub fn new(mode: Mode, n_histories: usize, dt_max: f64) -> Self {
        Self {
            n_histories,
            dt_max,
            mode,
            params: ModeParams::default(),
            seed: None,
            threads: None,
            progress: default_progress(),
            output_dir: default_output_dir(),
        }
    }

    /// Read a configuration from a JSON file
    ///
    /// ```rust, no_run
    /// # use nkinetics_feynman::RunConfig;
    /// let config = RunConfig::from_json_file("path/to/run.json").unwrap();
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Set the fraction of windows used by [Mode::Choice]
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.params.fraction = Some(fraction);
        self
    }

    /// Set the correlation time used by [Mode::Skip]
    pub fn with_corr_time(mut self, corr_time: f64) -> Self {
        self.params.corr_time = Some(corr_time);
        self
    }

    /// Set the number of skipped levels for [Mode::Mca]
    pub fn with_skip_mca(mut self, skip: usize) -> Self {
        self.params.skip_mca = Some(skip);
        self
    }

    /// Set the window allocation method for [Mode::Mca]
    pub fn with_method_mca(mut self, method: McaMethod) -> Self {
        self.params.method_mca = Some(method);
        self
    }

    /// Fix the seed for reproducible random selections
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Directory that result files are written to
    pub fn with_output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Do not print the progress indicators
    pub fn disable_progress(mut self) -> Self {
        self.progress = false;
        self
    }
}
