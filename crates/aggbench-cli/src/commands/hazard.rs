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

//! Hazard command - repeats the unsynchronized append experiment

use crate::error::CliError;
use aggbench::run_hazard_trials;
use colored::Colorize;
use tracing::debug;

/// Runs `trials` unsynchronized append experiments and prints one line per
/// trial. Observing lost updates is the expected outcome, not a failure.
pub fn hazard(size: usize, workers: usize, trials: usize) -> Result<(), CliError> {
    debug!(size, workers, trials, "starting hazard trials");
    let results = run_hazard_trials(size, workers, trials)?;

    println!(
        "{} {} appends x {} workers, {} trials",
        "Hazard:".bright_blue().bold(),
        size,
        workers,
        trials
    );
    for (index, report) in results.reports.iter().enumerate() {
        let marker = if report.has_anomaly() {
            "✗".red().bold()
        } else {
            "✓".green().bold()
        };
        println!(
            "  {} trial {:>3}: actual={} distinct={} duplicates={} missing={} ({:.2?})",
            marker,
            index + 1,
            report.actual,
            report.distinct,
            report.duplicates,
            report.missing,
            report.elapsed
        );
    }
    println!(
        "{} {} of {} trials lost or duplicated updates (worst: {} missing)",
        "Anomalies:".yellow().bold(),
        results.anomalous,
        trials,
        results.worst_missing()
    );
    Ok(())
}
