//! Raw detector pulse trains

// crate modules
use crate::error::{Error, Result};

// external crates
use log::{debug, warn};

/// Pulse counts from one detector at a fixed base time step
///
/// Each entry is the number of pulses recorded in one base interval of
/// `dt_base` seconds. The trace is immutable once constructed.
///
/// ```rust
/// # use nkinetics_feynman::RawTrace;
/// let trace = RawTrace::new("ch1", 1.0e-3, vec![4, 6, 5, 5]).unwrap();
/// assert_eq!(trace.len(), 4);
/// assert_eq!(trace.total_counts(), 20);
///
/// // time steps must be finite and positive
/// assert!(RawTrace::new("ch1", 0.0, vec![1, 2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrace {
    detector: String,
    dt_base: f64,
    counts: Vec<u32>,
}

impl RawTrace {
    /// Wrap the counts of one detector
    pub fn new<S: Into<String>>(detector: S, dt_base: f64, counts: Vec<u32>) -> Result<Self> {
        check_time_step(dt_base)?;
        Ok(Self {
            detector: detector.into(),
            dt_base,
            counts,
        })
    }

    /// Detector identifier used to label outputs
    pub fn detector(&self) -> &str {
        &self.detector
    }

    /// Replace the detector identifier
    pub fn with_detector<S: Into<String>>(mut self, detector: S) -> Self {
        self.detector = detector.into();
        self
    }

    /// Base sampling interval (s)
    pub fn dt_base(&self) -> f64 {
        self.dt_base
    }

    /// Counts per base interval
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of base intervals
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no samples were recorded
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of every count in the trace
    pub fn total_counts(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Copy of the first `length` samples, used to align multiple channels
    pub(crate) fn truncated(&self, length: usize) -> Self {
        Self {
            detector: self.detector.clone(),
            dt_base: self.dt_base,
            counts: self.counts[..length.min(self.len())].to_vec(),
        }
    }
}

/// Element-wise sum of every trace into a single synthetic trace
///
/// Traces must share the same `dt_base`. Longer traces are truncated to the
/// shortest so every sample has a contribution from every detector. The new
/// detector identifier joins the originals with `+`.
///
/// ```rust
/// # use nkinetics_feynman::{sum_traces, RawTrace};
/// let a = RawTrace::new("ch1", 1.0e-3, vec![1, 2, 3]).unwrap();
/// let b = RawTrace::new("ch2", 1.0e-3, vec![4, 5]).unwrap();
///
/// let sum = sum_traces(&[a, b]).unwrap();
/// assert_eq!(sum.detector(), "ch1+ch2");
/// assert_eq!(sum.counts(), &[5, 7]);
/// ```
pub fn sum_traces(traces: &[RawTrace]) -> Result<RawTrace> {
    let first = traces.first().ok_or(Error::NoTraces)?;
    check_common_time_step(traces)?;

    let length = common_length(traces);
    let mut counts = vec![0u32; length];
    for trace in traces {
        for (total, &c) in counts.iter_mut().zip(trace.counts()) {
            *total = total.saturating_add(c);
        }
    }

    let detector = traces
        .iter()
        .map(|t| t.detector())
        .collect::<Vec<&str>>()
        .join("+");

    debug!("Summed {} traces into \"{detector}\"", traces.len());
    RawTrace::new(detector, first.dt_base(), counts)
}

/// Length of the shortest trace, with a warning if samples are dropped
pub(crate) fn common_length(traces: &[RawTrace]) -> usize {
    let length = traces.iter().map(|t| t.len()).min().unwrap_or(0);
    for trace in traces.iter().filter(|t| t.len() > length) {
        warn!(
            "Trace \"{}\" truncated from {} to {length} samples",
            trace.detector(),
            trace.len()
        );
    }
    length
}

/// All traces in a multi-channel calculation need the same time step
pub(crate) fn check_common_time_step(traces: &[RawTrace]) -> Result<()> {
    let Some(first) = traces.first() else {
        return Ok(());
    };

    match traces.iter().find(|t| t.dt_base() != first.dt_base()) {
        Some(other) => Err(Error::TimeStepMismatch {
            expected: first.dt_base(),
            found: other.dt_base(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_time_step(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTimeStep(dt))
    }
}
