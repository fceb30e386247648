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

//! Aggregation strategy benchmarks.
//!
//! Criterion counterpart of the built-in harness:
//! - The three standard strategies on every collection kind
//! - Parallel pipeline scaling with worker count (1, 2, 4, 8 threads)
//!
//! Run with: cargo bench --package aggbench --bench strategies

use aggbench::strategy::{standard_strategies, ParallelPipeline};
use aggbench::{CollectionKind, Pipeline, Strategy, WorkerPool, Workload};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const SIZES: [usize; 2] = [10_000, 1_000_000];

fn bench_strategies(c: &mut Criterion) {
    let pool = WorkerPool::with_default_size().unwrap();

    for kind in CollectionKind::all() {
        let mut group = c.benchmark_group(format!("{}_sum", kind.as_str()));

        for &size in &SIZES {
            let workload = Workload::generate_kind(kind, size).unwrap();
            group.throughput(Throughput::Elements(size as u64));

            for strategy in standard_strategies(Pipeline::sum(), pool.clone()).unwrap() {
                group.bench_with_input(
                    BenchmarkId::new(strategy.name(), size),
                    &workload,
                    |b, workload| b.iter(|| black_box(strategy.run(black_box(workload)).unwrap())),
                );
            }
        }
        group.finish();
    }
}

fn bench_parallel_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_scaling");
    let workload = Workload::generate(1_000_000).unwrap();
    group.throughput(Throughput::Elements(workload.len() as u64));

    for threads in [1, 2, 4, 8] {
        let pool = WorkerPool::new(threads).unwrap();
        let strategy = ParallelPipeline::new(Pipeline::sum(), pool).unwrap();

        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, _| {
            b.iter(|| black_box(strategy.run(black_box(&workload)).unwrap()))
        });
    }
    group.finish();
}

criterion_group! {
    name = strategy_benches;
    config = Criterion::default().sample_size(20);
    targets =
        bench_strategies,
        bench_parallel_scaling,
}

criterion_main!(strategy_benches);
