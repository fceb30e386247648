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

//! Fixed-size worker pool for parallel strategies and the hazard experiment.
//!
//! Parallel work follows an explicit partition -> map -> combine protocol:
//! [`WorkerPool::fold_partitions`] folds every partition on a pool thread and
//! collects the partials, then [`WorkerPool::combine`] reduces the collected
//! partials on the calling thread, consuming each exactly once. Nothing is
//! combined in place across threads.

use crate::config::default_worker_threads;
use crate::error::{BenchError, Result};
use crate::workload::Workload;
use std::sync::Arc;

/// Partitions created per worker thread for list workloads.
pub const PARTITIONS_PER_WORKER: usize = 4;

/// A rayon thread pool with a fixed number of workers.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    inner: Arc<rayon::ThreadPool>,
    workers: usize,
}

impl WorkerPool {
    /// Builds a pool with exactly `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(BenchError::config("worker_threads", "must be at least 1"));
        }
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("aggbench-worker-{}", index))
            .build()
            .map_err(|e| BenchError::config("worker_threads", e.to_string()))?;

        Ok(Self {
            inner: Arc::new(inner),
            workers,
        })
    }

    /// Builds a pool sized by the available hardware parallelism.
    pub fn with_default_size() -> Result<Self> {
        Self::new(default_worker_threads())
    }

    /// Returns the number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Partition length giving each worker [`PARTITIONS_PER_WORKER`] partitions.
    pub fn partition_len(&self, len: usize) -> usize {
        let partitions = self.workers * PARTITIONS_PER_WORKER;
        len.div_ceil(partitions).max(1)
    }

    /// Folds every partition of `workload` on the pool and returns the partials.
    pub fn fold_partitions<T, ID, F>(&self, workload: &Workload, identity: ID, fold: F) -> Vec<T>
    where
        T: Send,
        ID: Fn() -> T + Sync + Send,
        F: Fn(T, i64) -> T + Sync + Send,
    {
        let partition_len = self.partition_len(workload.len());
        self.inner
            .install(|| workload.fold_partitions(partition_len, identity, fold))
    }

    /// Reduces collected partials in a single pass.
    ///
    /// The result only depends on the partition layout when `combine` is
    /// associative and commutative.
    pub fn combine<T, C>(partials: Vec<T>, identity: T, combine: C) -> T
    where
        C: Fn(T, T) -> T,
    {
        partials.into_iter().fold(identity, combine)
    }

    /// Spawns `tasks` tasks on the pool and blocks until every one has finished.
    pub fn run_tasks<F>(&self, tasks: usize, task: F)
    where
        F: Fn(usize) + Sync,
    {
        self.inner.scope(|scope| {
            for index in 0..tasks {
                let task = &task;
                scope.spawn(move |_| task(index));
            }
        });
    }
}
