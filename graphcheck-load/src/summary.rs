use crate::dataset::Phase;
use graphcheck_model::ResourceKind;
use std::fmt;
use std::time::Duration;

/// Totals for one phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub operations: usize,
    pub failures: usize,
    /// Sum of every call's latency
    pub total: Duration,
}

impl PhaseSummary {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            operations: 0,
            failures: 0,
            total: Duration::ZERO,
        }
    }

    pub fn mean_latency(&self) -> Duration {
        if self.operations == 0 {
            return Duration::ZERO;
        }
        self.total.div_f64(self.operations as f64)
    }
}

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub kind: ResourceKind,
    pub seed: u64,
    pub objects: usize,
    pub interval: usize,
    pub phases: Vec<PhaseSummary>,
    /// Ids still present after the delete phase
    pub leftover: usize,
}

impl LoadSummary {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseSummary> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn total_failures(&self) -> usize {
        self.phases.iter().map(|p| p.failures).sum()
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Load run on {}: {} objects, sampled every {}, seed {}",
            self.kind, self.objects, self.interval, self.seed
        )?;
        for phase in &self.phases {
            writeln!(
                f,
                "  {:<7} {:>7} ops {:>6} failed {:>10.3}s total {:>8.2}ms mean",
                phase.phase.label(),
                phase.operations,
                phase.failures,
                phase.total.as_secs_f64(),
                phase.mean_latency().as_secs_f64() * 1000.0
            )?;
        }
        if self.leftover > 0 {
            writeln!(f, "  {} {} could not be deleted", self.leftover, self.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_latency() {
        let mut summary = PhaseSummary::new(Phase::Add);
        assert_eq!(summary.mean_latency(), Duration::ZERO);

        summary.operations = 4;
        summary.total = Duration::from_millis(10);
        let mean = summary.mean_latency().as_nanos() as i128;
        assert!((mean - 2_500_000).abs() <= 1, "mean was {}ns", mean);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_mean_latency_beyond_u32_operations() {
        let mut summary = PhaseSummary::new(Phase::Delete);
        summary.operations = 1usize << 32;
        summary.total = Duration::from_millis(1u64 << 32);

        let mean = summary.mean_latency().as_nanos() as i128;
        assert!((mean - 1_000_000).abs() <= 1, "mean was {}ns", mean);
    }
}
