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

//! Run command - executes benchmarks and exports results

use crate::error::CliError;
use aggbench::report::export_json;
use aggbench::{standard_suite, BenchConfig, RunReport};
use colored::Colorize;
use std::path::Path;
use tracing::{debug, warn};

/// Runs the standard suite filtered by `patterns` and writes one CSV file
/// per benchmark group into the configured output directory.
///
/// # Errors
///
/// Returns `Err` for invalid configuration or selections before anything
/// runs. After the run, failed exports and result mismatches are reported
/// once every summary has been printed and every destination attempted.
pub fn run(config: BenchConfig, patterns: &[String], json: Option<&Path>) -> Result<(), CliError> {
    let output_dir = config.output_dir.clone();
    let policy = config.export_policy;
    debug!(?patterns, ?config, "starting benchmark run");
    let runner = standard_suite(config)?;
    let report = runner.run(patterns)?;

    print_summary(&report);

    let outcomes = report.export_groups(&output_dir, policy);
    let total = outcomes.len();
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(rows) => println!(
                "{} {} ({} rows)",
                "✓".green().bold(),
                outcome.path.display(),
                rows
            ),
            Err(err) => {
                failed += 1;
                warn!(
                    group = %outcome.group,
                    path = %outcome.path.display(),
                    "result file skipped"
                );
                eprintln!("{} {} - {}", "✗".red().bold(), outcome.path.display(), err);
            }
        }
    }

    if let Some(path) = json {
        export_json(&report, path)?;
        println!("{} {}", "✓".green().bold(), path.display());
    }

    if let Some(first) = report.mismatches.first() {
        return Err(CliError::Mismatch {
            count: report.mismatches.len(),
            first: format!(
                "{}/{} returned {}, {} returned {}",
                first.benchmark, first.strategy, first.actual, first.reference, first.expected
            ),
        });
    }
    if failed > 0 {
        warn!(failed, total, "some result files were not written");
        return Err(CliError::ExportFailed { failed, total });
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!(
        "{:<12} {:<22} {:<13} {:>14} {:<6} {:>7}",
        "Benchmark".bold(),
        "Strategy".bold(),
        "Mode".bold(),
        "Score".bold(),
        "Unit".bold(),
        "Samples".bold()
    );
    for record in report.records() {
        println!(
            "{:<12} {:<22} {:<13} {:>14.3} {:<6} {:>7}",
            record.benchmark,
            record.strategy,
            record.mode.as_str(),
            record.score,
            record.unit.label(),
            record.samples
        );
    }

    for outcome in report.incomplete() {
        eprintln!(
            "{} {}/{}: time budget exhausted after {} samples ({} skipped)",
            "!".yellow().bold(),
            outcome.benchmark,
            outcome.strategy,
            outcome.samples,
            outcome.skipped
        );
    }
}
