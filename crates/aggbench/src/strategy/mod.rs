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

//! Aggregation strategies under test.
//!
//! Three interchangeable ways of running the same [`Pipeline`] over a
//! [`Workload`]:
//!
//! - [`SequentialLoop`]: explicit single-threaded loop (baseline)
//! - [`SequentialPipeline`]: single-threaded iterator composition
//! - [`ParallelPipeline`]: partitioned fold on a [`WorkerPool`](crate::pool::WorkerPool)
//!   followed by a strict combine over the partials
//!
//! For any reduction declared associative and commutative the three
//! strategies return the same value.

pub mod parallel;
pub mod pipeline;
pub mod sequential;

pub use parallel::ParallelPipeline;
pub use pipeline::{Associativity, Combiner, Mapper, Pipeline, Predicate, Reduction};
pub use sequential::{SequentialLoop, SequentialPipeline};

use crate::error::{BenchError, Result};
use crate::pool::WorkerPool;
use crate::workload::Workload;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Explicit loop.
    SequentialLoop,
    /// Iterator composition.
    SequentialPipeline,
    /// Worker pool decomposition.
    ParallelPipeline,
}

impl StrategyKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::SequentialLoop => "sequential-loop",
            StrategyKind::SequentialPipeline => "sequential-pipeline",
            StrategyKind::ParallelPipeline => "parallel-pipeline",
        }
    }

    /// Returns whether the strategy runs on more than one thread.
    pub fn is_parallel(&self) -> bool {
        matches!(self, StrategyKind::ParallelPipeline)
    }
}

/// Result of one timed strategy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Aggregated value.
    pub value: i64,
    /// Wall-clock time of the call.
    pub elapsed: Duration,
}

/// A named aggregation over a workload.
pub trait Strategy: Send + Sync {
    /// Name used in reports.
    fn name(&self) -> &str;

    /// Strategy family.
    fn kind(&self) -> StrategyKind;

    /// Checks the usage contract before any timing starts.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Aggregates the workload. This is the call the timing engine measures.
    fn run(&self, workload: &Workload) -> Result<i64>;

    /// Checks the workload, then runs and times a single call.
    fn execute(&self, workload: &Workload) -> Result<Execution> {
        ensure_workload(self.name(), workload)?;
        let start = Instant::now();
        let value = self.run(workload)?;
        let elapsed = start.elapsed();
        Ok(Execution { value, elapsed })
    }
}

/// Fails when `workload` holds no elements.
pub fn ensure_workload(strategy: &str, workload: &Workload) -> Result<()> {
    if workload.is_empty() {
        return Err(BenchError::config(
            "workload",
            format!("strategy '{}' was given an empty workload", strategy),
        ));
    }
    Ok(())
}

/// Builds the three standard strategies for `pipeline`, in comparison order.
///
/// # Errors
///
/// Returns [`BenchError::NonAssociativeReduction`] when the pipeline's
/// reduction is not declared associative and commutative.
pub fn standard_strategies(pipeline: Pipeline, pool: WorkerPool) -> Result<Vec<Arc<dyn Strategy>>> {
    Ok(vec![
        Arc::new(SequentialLoop::new(pipeline.clone())),
        Arc::new(SequentialPipeline::new(pipeline.clone())),
        Arc::new(ParallelPipeline::new(pipeline, pool)?),
    ])
}
