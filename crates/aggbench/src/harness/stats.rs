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

//! Statistics aggregation.
//!
//! Reduces the samples of one (benchmark, strategy) pair into a
//! [`SummaryRecord`]. Durations are converted to the reporting unit as
//! `f64` before any arithmetic, so no integer truncation happens.

use crate::config::TimeUnit;
use crate::error::{BenchError, Result};
use crate::harness::timing::IterationSample;
use serde::{Deserialize, Serialize};

/// Summary statistic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Arithmetic mean of all samples.
    AverageTime,
    /// Percentile distribution; the score is the median.
    SampleTime,
}

impl Mode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::AverageTime => "average-time",
            Mode::SampleTime => "sample-time",
        }
    }
}

/// Spread of the samples, in the record's unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Fastest sample.
    pub min: f64,
    /// Median.
    pub p50: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 99th percentile.
    pub p99: f64,
    /// Slowest sample.
    pub max: f64,
}

impl Distribution {
    /// Builds the distribution from values sorted in ascending order.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        Some(Self {
            min,
            p50: percentile(sorted, 50.0),
            p90: percentile(sorted, 90.0),
            p99: percentile(sorted, 99.0),
            max,
        })
    }
}

/// One result row for a (benchmark, strategy, mode) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Benchmark name.
    pub benchmark: String,
    /// Strategy name.
    pub strategy: String,
    /// Statistic family.
    pub mode: Mode,
    /// Mean (average-time) or median (sample-time).
    pub score: f64,
    /// Unit of `score` and `distribution`.
    pub unit: TimeUnit,
    /// Number of samples aggregated.
    pub samples: usize,
    /// Sample spread, present for sample-time records.
    pub distribution: Option<Distribution>,
}

/// Summarizes `samples` in the given mode and unit.
///
/// # Errors
///
/// Returns [`BenchError::InsufficientSamples`] for an empty sample slice.
///
/// # Example
///
/// ```
/// use aggbench::config::TimeUnit;
/// use aggbench::harness::{summarize, IterationSample, Mode};
/// use std::time::Duration;
///
/// let samples: Vec<IterationSample> = [10, 20, 30]
///     .iter()
///     .enumerate()
///     .map(|(i, ms)| IterationSample { iteration: i as u64, elapsed: Duration::from_millis(*ms) })
///     .collect();
/// let record = summarize(
///     "list-sum",
///     "sequential-loop",
///     &samples,
///     Mode::AverageTime,
///     TimeUnit::Milliseconds,
/// )
/// .unwrap();
/// assert_eq!(record.score, 20.0);
/// ```
pub fn summarize(
    benchmark: &str,
    strategy: &str,
    samples: &[IterationSample],
    mode: Mode,
    unit: TimeUnit,
) -> Result<SummaryRecord> {
    if samples.is_empty() {
        return Err(BenchError::InsufficientSamples {
            benchmark: benchmark.to_string(),
            strategy: strategy.to_string(),
        });
    }

    let mut values: Vec<f64> = samples.iter().map(|s| unit.convert(s.elapsed)).collect();

    let (score, distribution) = match mode {
        Mode::AverageTime => (mean(&values), None),
        Mode::SampleTime => {
            values.sort_by(|a, b| a.total_cmp(b));
            let distribution = Distribution::from_sorted(&values);
            (percentile(&values, 50.0), distribution)
        }
    };

    Ok(SummaryRecord {
        benchmark: benchmark.to_string(),
        strategy: strategy.to_string(),
        mode,
        score,
        unit,
        samples: samples.len(),
        distribution,
    })
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Nearest-rank percentile of ascending `sorted` values; 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn samples(millis: &[u64]) -> Vec<IterationSample> {
        millis
            .iter()
            .enumerate()
            .map(|(i, ms)| IterationSample {
                iteration: i as u64,
                elapsed: Duration::from_millis(*ms),
            })
            .collect()
    }

    #[test]
    fn test_average_time() {
        let record = summarize(
            "b",
            "s",
            &samples(&[100, 200, 300]),
            Mode::AverageTime,
            TimeUnit::Milliseconds,
        )
        .unwrap();
        assert_eq!(record.score, 200.0);
        assert_eq!(record.samples, 3);
        assert_eq!(record.mode, Mode::AverageTime);
        assert!(record.distribution.is_none());
    }

    #[test]
    fn test_average_keeps_fractions() {
        let input = vec![
            IterationSample { iteration: 0, elapsed: Duration::from_nanos(1) },
            IterationSample { iteration: 1, elapsed: Duration::from_nanos(2) },
        ];
        let record = summarize("b", "s", &input, Mode::AverageTime, TimeUnit::Nanoseconds).unwrap();
        assert_eq!(record.score, 1.5);
    }

    #[test]
    fn test_sample_time_distribution() {
        let input = samples(&[50, 10, 40, 20, 30]);
        let record = summarize("b", "s", &input, Mode::SampleTime, TimeUnit::Milliseconds).unwrap();
        assert_eq!(record.score, 30.0);
        let dist = record.distribution.unwrap();
        assert_eq!(dist.min, 10.0);
        assert_eq!(dist.p50, 30.0);
        assert_eq!(dist.p90, 50.0);
        assert_eq!(dist.max, 50.0);
    }

    #[test]
    fn test_empty_samples_rejected() {
        let err = summarize(
            "list-sum",
            "sequential-loop",
            &[],
            Mode::AverageTime,
            TimeUnit::Milliseconds,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BenchError::InsufficientSamples {
                benchmark: "list-sum".to_string(),
                strategy: "sequential-loop".to_string(),
            }
        );
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let input = samples(&[7, 3, 9, 1]);
        for mode in [Mode::AverageTime, Mode::SampleTime] {
            let a = summarize("b", "s", &input, mode, TimeUnit::Microseconds).unwrap();
            let b = summarize("b", "s", &input, mode, TimeUnit::Microseconds).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 90.0), 9.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::AverageTime.as_str(), "average-time");
        assert_eq!(Mode::SampleTime.as_str(), "sample-time");
    }
}
