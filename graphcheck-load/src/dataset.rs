//! Sample storage and CSV export

use crate::error::LoadResult;
use crate::probe::UsageSample;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Add,
    Change,
    Delete,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Add, Phase::Change, Phase::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Add => "Add",
            Phase::Change => "Change",
            Phase::Delete => "Delete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Measurements taken at one sampled operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Latency of the sampled call
    pub latency: Duration,
    /// Sum of every call's latency in the phase up to and including this one
    pub cumulative: Duration,
    pub usage: UsageSample,
}

/// Receiver of samples as a run produces them
pub trait SampleSink {
    fn record(&mut self, phase: Phase, index: usize, sample: Sample);
}

/// Samples keyed by operation index, one column group per phase
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: BTreeMap<usize, BTreeMap<Phase, Sample>>,
}

impl SampleSink for Dataset {
    fn record(&mut self, phase: Phase, index: usize, sample: Sample) {
        self.rows.entry(index).or_default().insert(phase, sample);
    }
}

/// One CSV line. Phases that never reached an index leave their cells empty.
#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "Objects Number")]
    objects: usize,
    #[serde(rename = "Sample Time for Add (s)")]
    sample_add: Option<f64>,
    #[serde(rename = "Sample Time for Change (s)")]
    sample_change: Option<f64>,
    #[serde(rename = "Sample Time for Delete (s)")]
    sample_delete: Option<f64>,
    #[serde(rename = "Transaction Time for Add (s)")]
    transaction_add: Option<f64>,
    #[serde(rename = "Transaction Time for Change (s)")]
    transaction_change: Option<f64>,
    #[serde(rename = "Transaction Time for Delete (s)")]
    transaction_delete: Option<f64>,
    #[serde(rename = "CPU % Use for Add")]
    cpu_add: Option<f64>,
    #[serde(rename = "CPU % Use for Change")]
    cpu_change: Option<f64>,
    #[serde(rename = "CPU % Use for Delete")]
    cpu_delete: Option<f64>,
    #[serde(rename = "Available Free Memory for Add (MB)")]
    memory_add: Option<f64>,
    #[serde(rename = "Available Free Memory for Change (MB)")]
    memory_change: Option<f64>,
    #[serde(rename = "Available Free Memory for Delete (MB)")]
    memory_delete: Option<f64>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize, phase: Phase) -> Option<&Sample> {
        self.rows.get(&index).and_then(|row| row.get(&phase))
    }

    /// Sampled operation indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    /// Samples of one phase in index order
    pub fn phase(&self, phase: Phase) -> Vec<(usize, Sample)> {
        self.rows
            .iter()
            .filter_map(|(index, row)| row.get(&phase).map(|s| (*index, *s)))
            .collect()
    }

    fn csv_rows(&self) -> impl Iterator<Item = CsvRow> + '_ {
        self.rows.iter().map(|(index, row)| {
            let latency = |p: Phase| row.get(&p).map(|s| s.latency.as_secs_f64());
            let cumulative = |p: Phase| row.get(&p).map(|s| s.cumulative.as_secs_f64());
            let cpu = |p: Phase| row.get(&p).map(|s| s.usage.cpu_percent);
            let memory = |p: Phase| row.get(&p).map(|s| s.usage.available_memory_mb);
            CsvRow {
                objects: *index,
                sample_add: latency(Phase::Add),
                sample_change: latency(Phase::Change),
                sample_delete: latency(Phase::Delete),
                transaction_add: cumulative(Phase::Add),
                transaction_change: cumulative(Phase::Change),
                transaction_delete: cumulative(Phase::Delete),
                cpu_add: cpu(Phase::Add),
                cpu_change: cpu(Phase::Change),
                cpu_delete: cpu(Phase::Delete),
                memory_add: memory(Phase::Add),
                memory_change: memory(Phase::Change),
                memory_delete: memory(Phase::Delete),
            }
        })
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> LoadResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in self.csv_rows() {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> LoadResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)
    }
}
