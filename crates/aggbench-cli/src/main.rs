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

//! AggBench Command Line Interface

use aggbench_cli::cli::Commands;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// AggBench - aggregation strategy benchmarks
///
/// Times a sequential loop, a sequential pipeline and a parallel pipeline
/// summing list, map and set workloads, and demonstrates lost updates under
/// unsynchronized concurrent appends.
///
/// # Examples
///
/// ```bash
/// # Run the standard suite and write <group>-benchmark-results.csv files
/// aggbench run --output-dir results
///
/// # Only the list benchmark, sample-time mode, microseconds
/// aggbench run list-sum --mode sample-time --unit us
///
/// # Lost-update experiment
/// aggbench hazard --size 100000 --workers 4 --trials 20
/// ```
#[derive(Parser)]
#[command(name = "aggbench")]
#[command(author, version, about = "AggBench - aggregation strategy benchmarks", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let directive = if cli.verbose { "aggbench=debug" } else { "aggbench=info" };
    let filter = match directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
