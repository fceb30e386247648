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

//! Worker-pool strategy.

use super::{Pipeline, Strategy, StrategyKind};
use crate::error::{BenchError, Result};
use crate::pool::WorkerPool;
use crate::workload::Workload;

/// Folds workload partitions on a [`WorkerPool`] and combines the partials.
///
/// Partition processing order is not defined; the combine step sees every
/// partial exactly once. Construction fails unless the reduction is declared
/// associative and commutative.
#[derive(Debug, Clone)]
pub struct ParallelPipeline {
    name: String,
    pipeline: Pipeline,
    pool: WorkerPool,
}

impl ParallelPipeline {
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::NonAssociativeReduction`] for reductions whose
    /// associativity is unknown.
    pub fn new(pipeline: Pipeline, pool: WorkerPool) -> Result<Self> {
        let strategy = Self {
            name: StrategyKind::ParallelPipeline.as_str().to_string(),
            pipeline,
            pool,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// Overrides the report name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the number of workers.
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }
}

impl Strategy for ParallelPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ParallelPipeline
    }

    fn validate(&self) -> Result<()> {
        if !self.pipeline.reduction().is_parallel_safe() {
            return Err(BenchError::NonAssociativeReduction {
                strategy: self.name.clone(),
                reduction: self.pipeline.reduction().name().to_string(),
            });
        }
        Ok(())
    }

    fn run(&self, workload: &Workload) -> Result<i64> {
        let pipeline = &self.pipeline;
        let partials = self.pool.fold_partitions(
            workload,
            || pipeline.identity(),
            |acc, v| pipeline.step(acc, v),
        );
        Ok(WorkerPool::combine(partials, pipeline.identity(), |a, b| {
            pipeline.combine(a, b)
        }))
    }
}
