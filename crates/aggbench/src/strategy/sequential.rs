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

//! Single-threaded strategies.

use super::{Pipeline, Strategy, StrategyKind};
use crate::error::Result;
use crate::workload::Workload;

/// Explicit loop accumulating into one local.
#[derive(Debug, Clone)]
pub struct SequentialLoop {
    name: String,
    pipeline: Pipeline,
}

impl SequentialLoop {
    /// Creates the strategy with its default name.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            name: StrategyKind::SequentialLoop.as_str().to_string(),
            pipeline,
        }
    }

    /// Overrides the report name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Strategy for SequentialLoop {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SequentialLoop
    }

    fn run(&self, workload: &Workload) -> Result<i64> {
        let mut acc = self.pipeline.identity();
        for value in workload.values() {
            if self.pipeline.accept(value) {
                acc = self.pipeline.combine(acc, self.pipeline.transform(value));
            }
        }
        Ok(acc)
    }
}

/// Iterator composition: `filter`, `map`, then `fold`.
#[derive(Debug, Clone)]
pub struct SequentialPipeline {
    name: String,
    pipeline: Pipeline,
}

impl SequentialPipeline {
    /// Creates the strategy with its default name.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            name: StrategyKind::SequentialPipeline.as_str().to_string(),
            pipeline,
        }
    }

    /// Overrides the report name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Strategy for SequentialPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SequentialPipeline
    }

    fn run(&self, workload: &Workload) -> Result<i64> {
        let pipeline = &self.pipeline;
        Ok(workload
            .values()
            .filter(|&v| pipeline.accept(v))
            .map(|v| pipeline.transform(v))
            .fold(pipeline.identity(), |acc, v| pipeline.combine(acc, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Reduction;

    #[test]
    fn test_loop_sum() {
        let workload = Workload::generate(100).unwrap();
        assert_eq!(SequentialLoop::new(Pipeline::sum()).run(&workload).unwrap(), 4_950);
    }

    #[test]
    fn test_pipeline_matches_loop() {
        let workload = Workload::generate(10_000).unwrap();
        let pipeline = Pipeline::sum().with_filter(|v| v % 3 == 0).with_map(|v| v * v);
        let looped = SequentialLoop::new(pipeline.clone()).run(&workload).unwrap();
        let piped = SequentialPipeline::new(pipeline).run(&workload).unwrap();
        assert_eq!(looped, piped);
    }

    #[test]
    fn test_sequential_accepts_non_associative_reduction() {
        let workload = Workload::generate(4).unwrap();
        let pipeline = Pipeline::new(Reduction::custom("subtract", 10, |a, b| a - b));
        let looped = SequentialLoop::new(pipeline.clone());
        assert!(looped.validate().is_ok());
        assert_eq!(looped.run(&workload).unwrap(), 10 - 0 - 1 - 2 - 3);
        assert_eq!(SequentialPipeline::new(pipeline).run(&workload).unwrap(), 4);
    }

    #[test]
    fn test_named() {
        let strategy = SequentialLoop::new(Pipeline::sum()).named("listLoopSum");
        assert_eq!(strategy.name(), "listLoopSum");
        assert_eq!(strategy.kind(), StrategyKind::SequentialLoop);
    }
}
