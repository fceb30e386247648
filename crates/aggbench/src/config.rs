// Dweve AggBench - Aggregation Strategy Benchmarks
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Centralized benchmark configuration.
//!
//! Provides iteration counts, output modes, time units, worker pool sizing,
//! time budgets and export settings for a benchmark run.

use crate::error::{validate_workload_size, BenchError, Result};
use crate::harness::stats::Mode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of discarded warmup iterations.
pub const DEFAULT_WARMUP_ITERATIONS: u64 = 5;

/// Default number of measured iterations.
pub const DEFAULT_MEASURED_ITERATIONS: u64 = 10;

/// Default workload size for the standard suite.
pub const DEFAULT_WORKLOAD_SIZE: usize = 1_000_000;

/// Which summary records a run produces for each strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputMode {
    /// Mean time per call only.
    AverageTime,
    /// Percentile distribution only.
    SampleTime,
    /// Both records.
    Both,
}

impl OutputMode {
    /// Returns the summary modes this output mode expands to, in output order.
    pub fn modes(&self) -> &'static [Mode] {
        match self {
            OutputMode::AverageTime => &[Mode::AverageTime],
            OutputMode::SampleTime => &[Mode::SampleTime],
            OutputMode::Both => &[Mode::AverageTime, Mode::SampleTime],
        }
    }
}

/// Unit every duration is normalized to before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
}

impl TimeUnit {
    /// Converts a duration into this unit as a floating point value.
    pub fn convert(&self, duration: Duration) -> f64 {
        let nanos = duration.as_nanos() as f64;
        match self {
            TimeUnit::Nanoseconds => nanos,
            TimeUnit::Microseconds => nanos / 1_000.0,
            TimeUnit::Milliseconds => nanos / 1_000_000.0,
            TimeUnit::Seconds => nanos / 1_000_000_000.0,
        }
    }

    /// Returns the per-operation label written to result files.
    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns/op",
            TimeUnit::Microseconds => "us/op",
            TimeUnit::Milliseconds => "ms/op",
            TimeUnit::Seconds => "s/op",
        }
    }
}

/// What happens when a result file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportPolicy {
    /// Truncate and rewrite the file on every run.
    Overwrite,
    /// Append rows; the header is written only to new or empty files.
    Append,
}

/// Benchmark run configuration.
///
/// # Example
///
/// ```
/// use aggbench::config::{BenchConfig, OutputMode, TimeUnit};
/// use std::time::Duration;
///
/// let config = BenchConfig::default()
///     .with_warmup_iterations(2)
///     .with_measured_iterations(20)
///     .with_output_mode(OutputMode::AverageTime)
///     .with_unit(TimeUnit::Microseconds)
///     .with_time_budget(Duration::from_secs(30));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Discarded iterations before measurement.
    pub warmup_iterations: u64,
    /// Measured iterations per strategy.
    pub measured_iterations: u64,
    /// Summary records to produce.
    pub output_mode: OutputMode,
    /// Unit for reported scores.
    pub unit: TimeUnit,
    /// Wall-clock budget per benchmark run.
    pub time_budget: Option<Duration>,
    /// Worker pool size for parallel strategies (`None` = hardware parallelism).
    pub worker_threads: Option<usize>,
    /// Number of elements in generated workloads.
    pub workload_size: usize,
    /// Directory receiving one result file per benchmark group.
    pub output_dir: PathBuf,
    /// Overwrite or append to existing result files.
    pub export_policy: ExportPolicy,
}

impl BenchConfig {
    /// Sets the warmup iteration count.
    pub fn with_warmup_iterations(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Sets the measured iteration count.
    pub fn with_measured_iterations(mut self, iterations: u64) -> Self {
        self.measured_iterations = iterations;
        self
    }

    /// Sets the output mode.
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Sets the reporting unit.
    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the wall-clock budget per benchmark run.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Overrides the worker pool size.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Sets the workload size.
    pub fn with_workload_size(mut self, size: usize) -> Self {
        self.workload_size = size;
        self
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the export policy.
    pub fn with_export_policy(mut self, policy: ExportPolicy) -> Self {
        self.export_policy = policy;
        self
    }

    /// Returns the worker pool size, falling back to the available hardware parallelism.
    pub fn resolved_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(default_worker_threads)
    }

    /// Rejects configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.measured_iterations == 0 {
            return Err(BenchError::config(
                "measured_iterations",
                "must be at least 1",
            ));
        }
        validate_workload_size(self.workload_size)?;
        if self.worker_threads == Some(0) {
            return Err(BenchError::config("worker_threads", "must be at least 1"));
        }
        if self.time_budget == Some(Duration::ZERO) {
            return Err(BenchError::config("time_budget", "must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
            measured_iterations: DEFAULT_MEASURED_ITERATIONS,
            output_mode: OutputMode::Both,
            unit: TimeUnit::Milliseconds,
            time_budget: None,
            worker_threads: None,
            workload_size: DEFAULT_WORKLOAD_SIZE,
            output_dir: PathBuf::from("."),
            export_policy: ExportPolicy::Overwrite,
        }
    }
}

/// Available hardware parallelism, or 1 when it cannot be queried.
pub fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.warmup_iterations, DEFAULT_WARMUP_ITERATIONS);
        assert_eq!(config.measured_iterations, DEFAULT_MEASURED_ITERATIONS);
        assert_eq!(config.output_mode, OutputMode::Both);
        assert_eq!(config.unit, TimeUnit::Milliseconds);
        assert_eq!(config.export_policy, ExportPolicy::Overwrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_measured_iterations_rejected() {
        let err = BenchConfig::default()
            .with_measured_iterations(0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Configuration { ref parameter, .. } if parameter == "measured_iterations"
        ));
    }

    #[test]
    fn test_zero_warmup_allowed() {
        assert!(BenchConfig::default()
            .with_warmup_iterations(0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_pool_and_budget() {
        assert!(BenchConfig::default().with_worker_threads(0).validate().is_err());
        assert!(BenchConfig::default()
            .with_time_budget(Duration::ZERO)
            .validate()
            .is_err());
        assert!(BenchConfig::default().with_workload_size(0).validate().is_err());
    }

    #[test]
    fn test_worker_threads_resolution() {
        assert_eq!(BenchConfig::default().with_worker_threads(3).resolved_worker_threads(), 3);
        assert!(BenchConfig::default().resolved_worker_threads() >= 1);
    }

    #[test]
    fn test_time_unit_conversion() {
        let d = Duration::from_micros(1_500);
        assert_eq!(TimeUnit::Nanoseconds.convert(d), 1_500_000.0);
        assert_eq!(TimeUnit::Microseconds.convert(d), 1_500.0);
        assert_eq!(TimeUnit::Milliseconds.convert(d), 1.5);
        assert_eq!(TimeUnit::Milliseconds.label(), "ms/op");
    }

    #[test]
    fn test_output_mode_expansion() {
        assert_eq!(OutputMode::Both.modes(), &[Mode::AverageTime, Mode::SampleTime]);
        assert_eq!(OutputMode::SampleTime.modes(), &[Mode::SampleTime]);
    }
}
