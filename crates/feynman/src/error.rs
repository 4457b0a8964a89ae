//! Result and Error types for nkinetics-feynman

use crate::config::Mode;

/// Type alias for Result<T, feynman::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `nkinetics-feynman` crate
///
/// Configuration errors are raised before any parallel work starts, data
/// sufficiency errors abort the run, and everything else is propagated from
/// the underlying I/O or parsing.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed serde JSON operation")]
    JSONError(#[from] serde_json::Error),

    #[error("failed to build worker pool")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    #[error("statistics failed: {0}")]
    StatisticsError(#[from] nkinetics_utils::Error),

    #[error("unknown calculation mode \"{0}\"")]
    UnknownMode(String),

    #[error("unknown MCA method \"{0}\" (expected constant or A_over_k)")]
    UnknownMcaMethod(String),

    #[error("mode {mode} requires the \"{name}\" parameter")]
    MissingParameter { name: &'static str, mode: Mode },

    #[error("invalid value for \"{name}\" ({value}), {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("mode {mode} requires at least {required} traces (found {found})")]
    TooFewTraces {
        mode: Mode,
        required: usize,
        found: usize,
    },

    #[error("no traces provided")]
    NoTraces,

    #[error("{detectors} detector identifiers for {traces} traces")]
    DetectorCountMismatch { detectors: usize, traces: usize },

    #[error("invalid time step {0} (must be finite and positive)")]
    InvalidTimeStep(f64),

    #[error("traces do not share a time step ({expected} != {found})")]
    TimeStepMismatch { expected: f64, found: f64 },

    #[error(
        "insufficient data ({samples_per_history} samples per history for {max_levels} grouping levels)"
    )]
    InsufficientData {
        samples_per_history: usize,
        max_levels: usize,
    },

    #[error("history too short for level {level} ({windows} windows, need more than 1)")]
    InsufficientHistoryLength { level: usize, windows: usize },

    #[error("at least {required} histories are required (found {found})")]
    InsufficientHistories { required: usize, found: usize },

    #[error("no windows selected at grouping level {level}")]
    EmptyWindowSample { level: usize },

    #[error("inconsistent curve lengths (expected {expected}, found {found})")]
    LengthMismatch { expected: usize, found: usize },

    #[error("parser failed: {0}")]
    ParseError(String),

    #[error("header entry \"{0}\" not found")]
    MissingHeader(&'static str),
}
