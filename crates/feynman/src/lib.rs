//! Feynman-alpha grouping and aggregation for neutron pulse trains
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod aggregate;
mod analysis;
mod config;
mod context;
mod error;
mod kernel;
mod partition;
mod policy;
mod runner;
mod trace;
mod writer;

pub mod reader;

// inline the main processing pipeline for a nice public API
#[doc(inline)]
pub use analysis::{analyse, process_run, CurveSet};

#[doc(inline)]
pub use config::{McaMethod, Mode, ModeParams, RunConfig};

#[doc(inline)]
pub use context::{split_file_stem, RunContext};

#[doc(inline)]
pub use trace::{sum_traces, RawTrace};

#[doc(inline)]
pub use partition::{max_levels, partition, History, Partition};

#[doc(inline)]
pub use policy::Policy;

#[doc(inline)]
pub use kernel::{HistoryCurve, Level, LevelPlan, PairCurve};

#[doc(inline)]
pub use runner::Runner;

#[doc(inline)]
pub use aggregate::{aggregate, count_rate, AggregateCurve, CountRate};

#[doc(inline)]
pub use writer::{write_aggregate, write_histories, write_mpoints, write_results};

#[doc(inline)]
pub use reader::{read_aggregate, read_histories, read_mpoints};

#[doc(inline)]
pub use error::{Error, Result};
