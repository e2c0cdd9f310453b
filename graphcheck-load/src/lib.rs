//! Load and performance driver
//!
//! A [`LoadRun`] creates N+1 resources of one kind, replaces each of them
//! once and deletes them again, every phase in its own random order. Every
//! Kth operation of a phase is sampled: call latency, cumulative phase time,
//! CPU use and available memory. Samples land in a [`Dataset`] that is
//! exported as CSV.

pub mod dataset;
pub mod driver;
pub mod error;
pub mod probe;
pub mod summary;

pub use dataset::{Dataset, Phase, Sample, SampleSink};
pub use driver::{LoadOptions, LoadOutcome, LoadRun};
pub use error::{LoadError, LoadResult};
pub use probe::{SystemProbe, UsageProbe, UsageSample};
pub use summary::{LoadSummary, PhaseSummary};
