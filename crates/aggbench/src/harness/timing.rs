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

//! Timing engine.
//!
//! [`measure`] returns a lazy [`Measure`] iterator: nothing runs until the
//! first `next()`, which executes the warmup iterations and discards their
//! timings. Every following `next()` runs one measured call and yields its
//! [`IterationSample`]. Timestamps are taken immediately around
//! [`Strategy::run`]; workload checks and bookkeeping stay outside the timed
//! region. Each call to `measure` starts from scratch.

use crate::error::Result;
use crate::strategy::{ensure_workload, Strategy};
use crate::workload::Workload;
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Upper bound on the sample buffer reserved up front by [`Measure::finish`].
/// Larger runs grow the buffer as samples arrive.
pub const MAX_PREALLOCATED_SAMPLES: u64 = 1 << 16;

/// One measured call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationSample {
    /// Zero-based index among the measured iterations.
    pub iteration: u64,
    /// Wall-clock time of the call.
    pub elapsed: Duration,
}

/// Samples and bookkeeping of a drained [`Measure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRun {
    /// Measured samples in execution order.
    pub samples: Vec<IterationSample>,
    /// Measured iterations skipped because the time budget ran out.
    pub skipped: u64,
    /// Warmup iterations actually executed.
    pub warmups_completed: u64,
    /// Value returned by the last call, warmup included.
    pub value: Option<i64>,
}

impl SampleRun {
    /// Returns whether the budget cut the run short.
    pub fn is_incomplete(&self) -> bool {
        self.skipped > 0
    }
}

/// Creates a lazy measurement of `strategy` over `workload`.
///
/// With `measured_iterations == 0` the sequence is empty and no warmup runs.
///
/// # Example
///
/// ```
/// use aggbench::harness::measure;
/// use aggbench::strategy::{Pipeline, SequentialLoop};
/// use aggbench::Workload;
///
/// let workload = Workload::generate(1_000).unwrap();
/// let strategy = SequentialLoop::new(Pipeline::sum());
/// let run = measure(&strategy, &workload, 2, 5).finish().unwrap();
/// assert_eq!(run.samples.len(), 5);
/// assert_eq!(run.value, Some(499_500));
/// ```
pub fn measure<'a>(
    strategy: &'a dyn Strategy,
    workload: &'a Workload,
    warmup_iterations: u64,
    measured_iterations: u64,
) -> Measure<'a> {
    Measure {
        strategy,
        workload,
        warmup_remaining: warmup_iterations,
        warmups_completed: 0,
        measured_total: measured_iterations,
        next_iteration: 0,
        deadline: None,
        skipped: 0,
        last_value: None,
        checked: false,
        done: false,
    }
}

/// Lazy, finite sequence of measured iterations.
pub struct Measure<'a> {
    strategy: &'a dyn Strategy,
    workload: &'a Workload,
    warmup_remaining: u64,
    warmups_completed: u64,
    measured_total: u64,
    next_iteration: u64,
    deadline: Option<Instant>,
    skipped: u64,
    last_value: Option<i64>,
    checked: bool,
    done: bool,
}

impl<'a> Measure<'a> {
    /// Stops starting new iterations once `deadline` has passed. Iterations
    /// not started are counted as skipped.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Measured iterations skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Value returned by the most recent call.
    pub fn last_value(&self) -> Option<i64> {
        self.last_value
    }

    /// Drains the sequence.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the workload check or by the strategy.
    pub fn finish(mut self) -> Result<SampleRun> {
        let reserve = self.measured_total.min(MAX_PREALLOCATED_SAMPLES) as usize;
        let mut samples = Vec::with_capacity(reserve);
        while let Some(sample) = self.next() {
            samples.push(sample?);
        }
        Ok(SampleRun {
            samples,
            skipped: self.skipped,
            warmups_completed: self.warmups_completed,
            value: self.last_value,
        })
    }

    fn budget_exhausted(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn stop_for_budget(&mut self) {
        self.skipped = self.measured_total - self.next_iteration;
        self.done = true;
    }

    fn fail<T>(&mut self, err: crate::error::BenchError) -> Option<Result<T>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for Measure<'_> {
    type Item = Result<IterationSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.next_iteration >= self.measured_total {
            self.done = true;
            return None;
        }
        if !self.checked {
            self.checked = true;
            if let Err(err) = ensure_workload(self.strategy.name(), self.workload) {
                return self.fail(err);
            }
        }

        while self.warmup_remaining > 0 {
            if self.budget_exhausted() {
                self.stop_for_budget();
                return None;
            }
            match self.strategy.run(self.workload) {
                Ok(value) => self.last_value = Some(black_box(value)),
                Err(err) => return self.fail(err),
            }
            self.warmup_remaining -= 1;
            self.warmups_completed += 1;
        }

        if self.budget_exhausted() {
            self.stop_for_budget();
            return None;
        }

        let start = Instant::now();
        let outcome = self.strategy.run(black_box(self.workload));
        let elapsed = start.elapsed();

        match outcome {
            Ok(value) => {
                self.last_value = Some(black_box(value));
                let sample = IterationSample {
                    iteration: self.next_iteration,
                    elapsed,
                };
                self.next_iteration += 1;
                Some(Ok(sample))
            }
            Err(err) => self.fail(err),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = usize::try_from(self.measured_total - self.next_iteration).ok();
        (0, remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::strategy::{Pipeline, SequentialLoop, StrategyKind};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    /// Counts calls and sleeps a fixed time per call.
    struct Sleeper {
        calls: AtomicU64,
        delay: Duration,
    }

    impl Sleeper {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicU64::new(0),
                delay,
            }
        }
    }

    impl Strategy for Sleeper {
        fn name(&self) -> &str {
            "sleeper"
        }

        fn kind(&self) -> StrategyKind {
            StrategyKind::SequentialLoop
        }

        fn run(&self, _workload: &Workload) -> Result<i64> {
            thread::sleep(self.delay);
            Ok(self.calls.fetch_add(1, Ordering::SeqCst) as i64)
        }
    }

    #[test]
    fn test_warmups_are_discarded() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::ZERO);
        let run = measure(&sleeper, &workload, 3, 4).finish().unwrap();
        assert_eq!(run.samples.len(), 4);
        assert_eq!(run.warmups_completed, 3);
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 7);
        let indices: Vec<u64> = run.samples.iter().map(|s| s.iteration).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_is_lazy() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::ZERO);
        let mut measurement = measure(&sleeper, &workload, 2, 2);
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 0);
        assert!(measurement.next().is_some());
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_measured_iterations_is_empty() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::ZERO);
        let run = measure(&sleeper, &workload, 5, 0).finish().unwrap();
        assert!(run.samples.is_empty());
        assert!(!run.is_incomplete());
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_samples_record_elapsed_time() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::from_millis(2));
        let run = measure(&sleeper, &workload, 0, 3).finish().unwrap();
        assert!(run
            .samples
            .iter()
            .all(|s| s.elapsed >= Duration::from_millis(2)));
    }

    #[test]
    fn test_deadline_skips_remaining_iterations() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::from_millis(20));
        let deadline = Instant::now() + Duration::from_millis(50);
        let run = measure(&sleeper, &workload, 0, 100)
            .with_deadline(deadline)
            .finish()
            .unwrap();
        assert!(run.is_incomplete());
        assert!(!run.samples.is_empty());
        assert_eq!(run.samples.len() as u64 + run.skipped, 100);
    }

    #[test]
    fn test_unbounded_iterations_stop_at_deadline() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::from_millis(1));
        let deadline = Instant::now() + Duration::from_millis(10);
        let run = measure(&sleeper, &workload, 0, u64::MAX)
            .with_deadline(deadline)
            .finish()
            .unwrap();
        assert!(run.is_incomplete());
        assert!(run.samples.len() as u64 <= MAX_PREALLOCATED_SAMPLES);
        assert_eq!(run.samples.len() as u64 + run.skipped, u64::MAX);
    }

    #[test]
    fn test_expired_deadline_skips_everything() {
        let workload = Workload::generate(10).unwrap();
        let sleeper = Sleeper::new(Duration::ZERO);
        let run = measure(&sleeper, &workload, 2, 5)
            .with_deadline(Instant::now())
            .finish()
            .unwrap();
        assert!(run.samples.is_empty());
        assert_eq!(run.skipped, 5);
        assert_eq!(run.warmups_completed, 0);
    }

    #[test]
    fn test_restart_has_no_residual_state() {
        let workload = Workload::generate(100).unwrap();
        let strategy = SequentialLoop::new(Pipeline::sum());
        let first = measure(&strategy, &workload, 1, 3).finish().unwrap();
        let second = measure(&strategy, &workload, 1, 3).finish().unwrap();
        assert_eq!(first.samples.len(), second.samples.len());
        assert_eq!(second.samples[0].iteration, 0);
        assert_eq!(first.value, second.value);
    }

    #[test]
    fn test_strategy_error_stops_sequence() {
        struct Failing;
        impl Strategy for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            fn kind(&self) -> StrategyKind {
                StrategyKind::SequentialLoop
            }
            fn run(&self, _workload: &Workload) -> Result<i64> {
                Err(BenchError::config("sleeper", "always fails"))
            }
        }

        let workload = Workload::generate(10).unwrap();
        let mut measurement = measure(&Failing, &workload, 0, 3);
        assert!(matches!(measurement.next(), Some(Err(_))));
        assert!(measurement.next().is_none());
    }
}
