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

//! Shared-state hazard demonstration.
//!
//! Several workers append to one growable buffer and none of the appends
//! is synchronized. Each worker reads the shared length, writes its value at that slot
//! and stores `length + 1`. Interleaved read-modify-write cycles lose
//! updates, so the final buffer usually holds fewer elements than were
//! appended, and some slots are overwritten by more than one worker.
//!
//! The buffer is preallocated to the number of appends, so the race can
//! only lose or duplicate entries. It never reallocates and never writes
//! outside its own storage.
//!
//! Each append holds the length it read for a short spin before storing it
//! back, and every [`YIELD_INTERVAL`]th append yields the CPU inside that
//! window. On a single core the yield hands the buffer to another worker
//! mid-append, so updates interleave even without hardware parallelism.

use crate::error::{BenchError, Result};
use crate::pool::WorkerPool;
use serde::{Deserialize, Serialize};
use std::cell::UnsafeCell;
use std::collections::HashSet;
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const EMPTY: u64 = u64::MAX;
const START_GATE_TIMEOUT: Duration = Duration::from_millis(200);

/// Spin iterations between reading the length and storing it back.
pub const APPEND_WINDOW_SPINS: usize = 16;

/// Appends between CPU yields taken inside the read-modify-write window.
pub const YIELD_INTERVAL: usize = 256;

struct RacyBuffer {
    slots: Box<[UnsafeCell<u64>]>,
    len: UnsafeCell<usize>,
}

// SAFETY: concurrent access is intentionally unsynchronized; the lost
// updates it causes are what this module measures. Every access goes
// through volatile reads and writes of plain integers inside storage that
// stays allocated and fixed-size until all workers have joined, and
// `push` bounds-checks the index it read.
unsafe impl Sync for RacyBuffer {}

impl RacyBuffer {
    fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| UnsafeCell::new(EMPTY)).collect();
        Self {
            slots,
            len: UnsafeCell::new(0),
        }
    }

    fn push(&self, value: u64, yield_inside: bool) {
        // SAFETY: see the `Sync` impl above.
        unsafe {
            let len = black_box(std::ptr::read_volatile(self.len.get()));
            for _ in 0..APPEND_WINDOW_SPINS {
                std::hint::spin_loop();
            }
            if yield_inside {
                std::thread::yield_now();
            }
            if let Some(slot) = self.slots.get(len) {
                std::ptr::write_volatile(slot.get(), value);
                std::ptr::write_volatile(self.len.get(), len + 1);
            }
        }
    }

    fn into_parts(self) -> (Vec<u64>, usize) {
        let len = self.len.into_inner();
        let slots = self
            .slots
            .into_vec()
            .into_iter()
            .map(UnsafeCell::into_inner)
            .collect();
        (slots, len)
    }
}

/// Outcome of one unsynchronized append run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardReport {
    /// Appends issued.
    pub expected: usize,
    /// Final buffer length.
    pub actual: usize,
    /// Distinct values present in the buffer.
    pub distinct: usize,
    /// `actual - distinct`: entries not accounted for by a distinct value.
    pub duplicates: usize,
    /// Appends not reflected in the final length.
    pub missing: usize,
    /// Slots below the final length that no worker wrote.
    pub unwritten: usize,
    /// Worker threads used.
    pub workers: usize,
    /// Longest append phase of any worker, start gate excluded.
    pub elapsed: Duration,
}

impl HazardReport {
    /// Returns whether the run lost, duplicated or dropped any update.
    pub fn has_anomaly(&self) -> bool {
        self.actual != self.expected || self.distinct != self.expected
    }
}

/// Appends `0..size` to one shared buffer from `workers` threads without
/// synchronization and reports the damage.
///
/// The anomaly is the expected outcome and is never an error; a run with
/// no anomaly is also valid.
///
/// # Errors
///
/// Returns [`BenchError::Configuration`] when `size` or `workers` is zero.
pub fn run_hazard(size: usize, workers: usize) -> Result<HazardReport> {
    validate(size, workers)?;
    let pool = WorkerPool::new(workers)?;
    Ok(run_on_pool(&pool, size))
}

fn validate(size: usize, workers: usize) -> Result<()> {
    if size == 0 {
        return Err(BenchError::config("hazard.size", "must be at least 1"));
    }
    if workers == 0 {
        return Err(BenchError::config("hazard.workers", "must be at least 1"));
    }
    Ok(())
}

fn run_on_pool(pool: &WorkerPool, size: usize) -> HazardReport {
    let workers = pool.workers();
    let buffer = RacyBuffer::with_capacity(size);

    let ready = AtomicUsize::new(0);
    let longest_nanos = AtomicU64::new(0);

    pool.run_tasks(workers, |worker| {
        wait_for_peers(&ready, workers);
        let from = worker * size / workers;
        let to = (worker + 1) * size / workers;
        let took = append_range(&buffer, from, to);
        let nanos = u64::try_from(took.as_nanos()).unwrap_or(u64::MAX);
        longest_nanos.fetch_max(nanos, Ordering::Relaxed);
    });
    let elapsed = Duration::from_nanos(longest_nanos.into_inner());

    let (slots, len) = buffer.into_parts();
    let actual = len.min(size);
    let mut seen = HashSet::with_capacity(actual);
    let mut unwritten = 0;
    for &value in &slots[..actual] {
        if value == EMPTY {
            unwritten += 1;
        } else {
            seen.insert(value);
        }
    }
    let distinct = seen.len();

    let report = HazardReport {
        expected: size,
        actual,
        distinct,
        duplicates: actual.saturating_sub(distinct),
        missing: size.saturating_sub(actual),
        unwritten,
        workers,
        elapsed,
    };
    debug!(?report, "hazard run finished");
    report
}

// Appends `from..to` and returns the time spent appending.
fn append_range(buffer: &RacyBuffer, from: usize, to: usize) -> Duration {
    let started = Instant::now();
    for (offset, value) in (from..to).enumerate() {
        buffer.push(value as u64, offset % YIELD_INTERVAL == YIELD_INTERVAL - 1);
    }
    started.elapsed()
}

// Start gate so workers begin appending together. Gives up after
// `START_GATE_TIMEOUT` so a busy machine cannot stall the run.
fn wait_for_peers(ready: &AtomicUsize, workers: usize) {
    ready.fetch_add(1, Ordering::AcqRel);
    let gate = Instant::now();
    while ready.load(Ordering::Acquire) < workers && gate.elapsed() < START_GATE_TIMEOUT {
        std::thread::yield_now();
    }
}

/// Summary of repeated hazard runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardTrials {
    /// One report per trial.
    pub reports: Vec<HazardReport>,
    /// Trials that showed an anomaly.
    pub anomalous: usize,
}

impl HazardTrials {
    /// Returns whether at least one trial showed an anomaly.
    pub fn observed(&self) -> bool {
        self.anomalous > 0
    }

    /// Largest number of lost appends in any trial.
    pub fn worst_missing(&self) -> usize {
        self.reports.iter().map(|r| r.missing).max().unwrap_or(0)
    }
}

/// Repeats [`run_hazard`] `trials` times on one shared pool.
pub fn run_hazard_trials(size: usize, workers: usize, trials: usize) -> Result<HazardTrials> {
    validate(size, workers)?;
    if trials == 0 {
        return Err(BenchError::config("hazard.trials", "must be at least 1"));
    }
    let pool = WorkerPool::new(workers)?;

    let reports: Vec<HazardReport> = (0..trials).map(|_| run_on_pool(&pool, size)).collect();
    let anomalous = reports.iter().filter(|r| r.has_anomaly()).count();
    info!(trials, anomalous, size, workers, "hazard trials finished");

    Ok(HazardTrials { reports, anomalous })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_worker_is_exact() {
        let report = run_hazard(10_000, 1).unwrap();
        assert_eq!(report.actual, 10_000);
        assert_eq!(report.distinct, 10_000);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.missing, 0);
        assert_eq!(report.unwritten, 0);
        assert!(!report.has_anomaly());
    }

    #[test]
    fn test_counts_are_consistent() {
        let report = run_hazard(50_000, 4).unwrap();
        assert!(report.actual <= report.expected);
        assert!(report.distinct <= report.actual);
        assert_eq!(report.actual, report.distinct + report.duplicates);
        assert!(report.unwritten <= report.duplicates);
        assert_eq!(report.missing, report.expected - report.actual);
    }

    #[test]
    fn test_append_time_excludes_start_gate() {
        let ready = AtomicUsize::new(0);
        let gate = Instant::now();
        // The second peer never arrives, so the gate runs until its timeout.
        wait_for_peers(&ready, 2);
        assert!(gate.elapsed() >= START_GATE_TIMEOUT);

        let buffer = RacyBuffer::with_capacity(1_000);
        let took = append_range(&buffer, 0, 1_000);
        assert!(took < START_GATE_TIMEOUT);
        let (slots, len) = buffer.into_parts();
        assert_eq!(len, 1_000);
        assert!(slots.iter().all(|&v| v != EMPTY));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(run_hazard(0, 4), Err(BenchError::Configuration { .. })));
        assert!(matches!(run_hazard(10, 0), Err(BenchError::Configuration { .. })));
        assert!(matches!(
            run_hazard_trials(10, 2, 0),
            Err(BenchError::Configuration { .. })
        ));
    }

    #[test]
    fn test_trials_collect_every_report() {
        let trials = run_hazard_trials(1_000, 2, 5).unwrap();
        assert_eq!(trials.reports.len(), 5);
        assert!(trials.anomalous <= 5);
        assert!(trials.worst_missing() <= 1_000);
    }
}
