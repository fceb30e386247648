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

//! Dweve AggBench
//!
//! Micro-benchmarks comparing three ways of aggregating a collection of
//! integers, plus a demonstration of lost updates under unsynchronized
//! concurrent appends.
//!
//! ## Features
//!
//! - **Workloads**: ordered list, hash map and hash set of `0..n`
//! - **Strategies**: sequential loop, sequential pipeline, parallel pipeline
//! - **Harness**: warmup, measured iterations, optional time budget
//! - **Statistics**: average-time and sample-time summaries
//! - **Export**: one CSV file per benchmark group, JSON run reports
//! - **Hazard**: unsynchronized append experiment with loss metrics
//!
//! ## Usage
//!
//! ```no_run
//! use aggbench::{standard_suite, BenchConfig, ExportPolicy};
//!
//! let config = BenchConfig::default().with_measured_iterations(20);
//! let report = standard_suite(config)?.run_all()?;
//! report.verify()?;
//! for outcome in report.export_groups(std::path::Path::new("."), ExportPolicy::Overwrite) {
//!     outcome.result?;
//! }
//! # Ok::<(), aggbench::BenchError>(())
//! ```
//!
//! Run the criterion benchmarks:
//! ```bash
//! cargo bench --package aggbench
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod hazard;
pub mod pool;
pub mod report;
pub mod strategy;
pub mod workload;

pub use config::{BenchConfig, ExportPolicy, OutputMode, TimeUnit};
pub use error::{validate_workload_size, BenchError, Result, MAX_WORKLOAD_SIZE};
pub use harness::{
    group_file_name, measure, standard_suite, summarize, BenchmarkDefinition, BenchmarkRunner,
    IterationSample, Mode, RunReport, SummaryRecord,
};
pub use hazard::{run_hazard, run_hazard_trials, HazardReport, HazardTrials};
pub use pool::WorkerPool;
pub use strategy::{Pipeline, Reduction, Strategy, StrategyKind};
pub use workload::{CollectionKind, Workload, WorkloadSpec};
