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

//! Unsynchronized append experiment.

use aggbench::{run_hazard, run_hazard_trials, BenchError};

#[test]
fn test_concurrent_append_loses_updates() {
    let trials = run_hazard_trials(100_000, 4, 20).unwrap();
    assert_eq!(trials.reports.len(), 20);
    assert!(
        trials.reports.iter().any(|r| r.actual != 100_000),
        "no lost update in 20 trials: {:?}",
        trials.reports
    );
    assert!(trials.observed());
    assert!(trials.worst_missing() > 0);
}

#[test]
fn test_two_workers_interleave() {
    // Interleaving comes from yields inside the append window, so it shows
    // up on a single core as well.
    let trials = run_hazard_trials(20_000, 2, 5).unwrap();
    assert!(trials.observed(), "no anomaly in 5 trials: {:?}", trials.reports);
}

#[test]
fn test_report_records_raw_counts() {
    let report = run_hazard(20_000, 2).unwrap();
    assert_eq!(report.expected, 20_000);
    assert_eq!(report.workers, 2);
    assert_eq!(report.missing, report.expected.saturating_sub(report.actual));
    assert_eq!(report.duplicates, report.actual.saturating_sub(report.distinct));
}

#[test]
fn test_anomaly_is_not_an_error() {
    for _ in 0..5 {
        assert!(run_hazard(10_000, 4).is_ok());
    }
}

#[test]
fn test_zero_workers_rejected() {
    let err = run_hazard(1_000, 0).unwrap_err();
    assert!(matches!(err, BenchError::Configuration { .. }));
    assert!(err.to_string().contains("workers"));
}
