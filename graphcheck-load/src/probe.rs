//! Host resource sampling

use sysinfo::System;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Host usage at one sample point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSample {
    pub cpu_percent: f64,
    pub available_memory_mb: f64,
}

/// Source of CPU and memory figures for sample points
pub trait UsageProbe: Send {
    fn sample(&mut self) -> UsageSample;
}

/// [`UsageProbe`] over the local host.
///
/// CPU use is measured since the previous sample, so the first figure only
/// covers the time since the probe was created.
pub struct SystemProbe {
    system: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageProbe for SystemProbe {
    fn sample(&mut self) -> UsageSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        UsageSample {
            cpu_percent: f64::from(self.system.global_cpu_usage()),
            available_memory_mb: self.system.available_memory() as f64 / BYTES_PER_MB,
        }
    }
}
