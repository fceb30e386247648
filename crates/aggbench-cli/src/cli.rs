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

//! CLI command definitions and argument parsing.

use crate::commands;
use crate::error::CliError;
use aggbench::{BenchConfig, ExportPolicy, OutputMode, TimeUnit};
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Output mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Mean time per operation
    AverageTime,
    /// Median of the sampled distribution
    SampleTime,
    /// Both modes
    Both,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::AverageTime => OutputMode::AverageTime,
            ModeArg::SampleTime => OutputMode::SampleTime,
            ModeArg::Both => OutputMode::Both,
        }
    }
}

/// Time unit argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    /// Nanoseconds
    Ns,
    /// Microseconds
    Us,
    /// Milliseconds
    Ms,
    /// Seconds
    S,
}

impl From<UnitArg> for TimeUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Ns => TimeUnit::Nanoseconds,
            UnitArg::Us => TimeUnit::Microseconds,
            UnitArg::Ms => TimeUnit::Milliseconds,
            UnitArg::S => TimeUnit::Seconds,
        }
    }
}

/// Options shared by commands that build the benchmark suite.
#[derive(Debug, Args)]
pub struct SuiteArgs {
    /// Warmup iterations per strategy
    #[arg(long, default_value_t = aggbench::config::DEFAULT_WARMUP_ITERATIONS)]
    pub warmup: u64,

    /// Measured iterations per strategy
    #[arg(short = 'n', long, default_value_t = aggbench::config::DEFAULT_MEASURED_ITERATIONS)]
    pub iterations: u64,

    /// Elements per workload
    #[arg(short, long, default_value_t = aggbench::config::DEFAULT_WORKLOAD_SIZE)]
    pub size: usize,

    /// Worker threads for the parallel pipeline (default: available cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

impl SuiteArgs {
    /// Builds the benchmark configuration.
    pub fn config(&self) -> BenchConfig {
        let mut config = BenchConfig::default()
            .with_warmup_iterations(self.warmup)
            .with_measured_iterations(self.iterations)
            .with_workload_size(self.size);
        if let Some(threads) = self.threads {
            config = config.with_worker_threads(threads);
        }
        config
    }
}

/// Top-level CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run benchmarks and export results
    ///
    /// Writes one `<group>-benchmark-results.csv` file per benchmark group
    /// into the output directory. Existing files are replaced unless
    /// `--append` is given.
    Run {
        /// Glob patterns selecting benchmarks by name or group (default: all)
        #[arg(value_name = "PATTERN")]
        patterns: Vec<String>,

        #[command(flatten)]
        suite: SuiteArgs,

        /// Statistic(s) to report
        #[arg(short, long, value_enum, default_value = "both")]
        mode: ModeArg,

        /// Reporting unit
        #[arg(short, long, value_enum, default_value = "ms")]
        unit: UnitArg,

        /// Time budget per benchmark in seconds
        #[arg(long, value_name = "SECONDS")]
        budget_secs: Option<f64>,

        /// Directory for CSV results
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Append to existing result files instead of replacing them
        #[arg(long)]
        append: bool,

        /// Also write the full run report as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Demonstrate lost updates under unsynchronized concurrent appends
    Hazard {
        /// Appends per trial
        #[arg(short, long, default_value_t = 100_000)]
        size: usize,

        /// Concurrent workers
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Repeated trials
        #[arg(long, default_value_t = 20)]
        trials: usize,
    },

    /// List registered benchmarks
    List {
        #[command(flatten)]
        suite: SuiteArgs,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` for invalid options, failed exports and result
    /// mismatches between strategies.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Run {
                patterns,
                suite,
                mode,
                unit,
                budget_secs,
                output_dir,
                append,
                json,
            } => {
                let mut config = suite
                    .config()
                    .with_output_mode(mode.into())
                    .with_unit(unit.into())
                    .with_output_dir(output_dir)
                    .with_export_policy(if append {
                        ExportPolicy::Append
                    } else {
                        ExportPolicy::Overwrite
                    });
                if let Some(secs) = budget_secs {
                    config = config.with_time_budget(parse_budget(secs)?);
                }
                commands::run(config, &patterns, json.as_deref())
            }
            Commands::Hazard {
                size,
                workers,
                trials,
            } => commands::hazard(size, workers, trials),
            Commands::List { suite } => commands::list(suite.config()),
        }
    }
}

fn parse_budget(secs: f64) -> Result<Duration, CliError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(
            aggbench::BenchError::config("budget_secs", "must be a positive number of seconds")
                .into(),
        );
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| aggbench::BenchError::config("budget_secs", e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_budget() {
        assert_eq!(parse_budget(1.5).unwrap(), Duration::from_millis(1_500));
        assert!(parse_budget(0.0).is_err());
        assert!(parse_budget(-1.0).is_err());
        assert!(parse_budget(f64::NAN).is_err());
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(TimeUnit::from(UnitArg::Us), TimeUnit::Microseconds);
        assert_eq!(OutputMode::from(ModeArg::SampleTime), OutputMode::SampleTime);
    }
}
