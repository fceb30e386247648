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

//! Structured error types for the AggBench CLI.

use aggbench::BenchError;
use thiserror::Error;

/// The main error type for CLI operations.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Configuration, measurement or export error from the benchmark library.
    #[error(transparent)]
    Bench(#[from] BenchError),

    /// One or more result files could not be written. Results of the run
    /// are still printed.
    #[error("{failed} of {total} result files could not be written")]
    ExportFailed {
        /// Destinations that failed
        failed: usize,
        /// Destinations attempted
        total: usize,
    },

    /// Strategies of one benchmark disagreed on the aggregated value.
    #[error("{count} result mismatch(es) detected; first: {first}")]
    Mismatch {
        /// Number of mismatches
        count: usize,
        /// Description of the first mismatch
        first: String,
    },
}
