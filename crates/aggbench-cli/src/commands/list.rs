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

//! List command - shows registered benchmarks

use crate::error::CliError;
use aggbench::{group_file_name, standard_suite, BenchConfig};
use colored::Colorize;
use tracing::debug;

/// Prints every registered benchmark with its group, workload and strategies.
pub fn list(config: BenchConfig) -> Result<(), CliError> {
    let runner = standard_suite(config)?;
    debug!(benchmarks = runner.benchmarks().len(), "listing benchmark suite");

    for definition in runner.benchmarks() {
        let workload = definition.workload();
        println!(
            "{} [{}] {} x {} -> {}",
            definition.name().bold(),
            definition.group(),
            workload.kind.as_str(),
            workload.size,
            group_file_name(definition.group())
        );
        for strategy in definition.strategies() {
            println!("  - {} ({})", strategy.name(), strategy.kind().as_str());
        }
    }
    Ok(())
}
