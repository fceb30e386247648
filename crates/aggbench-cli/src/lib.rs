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

//! AggBench CLI library for argument parsing and command execution.
//!
//! # Commands
//!
//! - **run**: run the standard benchmark suite and export CSV results
//! - **hazard**: repeat the unsynchronized append experiment
//! - **list**: show the registered benchmarks and their strategies
//!
//! # Examples
//!
//! ```no_run
//! use aggbench_cli::commands::hazard;
//!
//! # fn main() -> Result<(), aggbench_cli::error::CliError> {
//! hazard(100_000, 4, 20)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
