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

//! Benchmark orchestrator.
//!
//! [`BenchmarkRunner`] owns the registered [`BenchmarkDefinition`]s. A run
//! validates the configuration and every selected strategy up front, then
//! for each benchmark generates the workload once, measures every strategy
//! against it, summarizes the samples and drops them. Results, incomplete
//! runs and result mismatches are collected in a [`RunReport`].

use crate::config::{BenchConfig, ExportPolicy};
use crate::error::{BenchError, Result};
use crate::harness::stats::{summarize, SummaryRecord};
use crate::harness::timing::measure;
use crate::pool::WorkerPool;
use crate::report::csv::export_csv;
use crate::strategy::{standard_strategies, Pipeline, Strategy, StrategyKind};
use crate::workload::{CollectionKind, WorkloadSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A named workload and the strategies compared on it.
#[derive(Clone)]
pub struct BenchmarkDefinition {
    name: String,
    group: String,
    workload: WorkloadSpec,
    strategies: Vec<Arc<dyn Strategy>>,
}

impl BenchmarkDefinition {
    /// Creates a definition with no strategies.
    pub fn new(name: impl Into<String>, group: impl Into<String>, workload: WorkloadSpec) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            workload,
            strategies: Vec::new(),
        }
    }

    /// Adds a strategy.
    pub fn with_strategy<S>(mut self, strategy: S) -> Self
    where
        S: Strategy + 'static,
    {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Adds several strategies, keeping their order.
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn Strategy>>) -> Self {
        self.strategies.extend(strategies);
        self
    }

    /// Returns the unique benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group this benchmark exports under.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the workload kind and size.
    pub fn workload(&self) -> WorkloadSpec {
        self.workload
    }

    /// Returns the strategies in comparison order.
    pub fn strategies(&self) -> &[Arc<dyn Strategy>] {
        &self.strategies
    }

    /// Checks the definition and every strategy contract.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BenchError::config("benchmark.name", "must not be empty"));
        }
        if self.strategies.is_empty() {
            return Err(BenchError::config(
                "benchmark.strategies",
                format!("benchmark '{}' has no strategies", self.name),
            ));
        }
        crate::error::validate_workload_size(self.workload.size)?;
        for (index, strategy) in self.strategies.iter().enumerate() {
            if self.strategies[..index].iter().any(|s| s.name() == strategy.name()) {
                return Err(BenchError::config(
                    "benchmark.strategies",
                    format!(
                        "benchmark '{}' lists strategy '{}' more than once",
                        self.name,
                        strategy.name()
                    ),
                ));
            }
            strategy.validate()?;
        }
        Ok(())
    }
}

impl fmt::Debug for BenchmarkDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("BenchmarkDefinition")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("workload", &self.workload)
            .field("strategies", &names)
            .finish()
    }
}

/// Per-strategy execution summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    /// Benchmark name.
    pub benchmark: String,
    /// Strategy name.
    pub strategy: String,
    /// Strategy family.
    pub kind: StrategyKind,
    /// Aggregated value of the last call.
    pub value: Option<i64>,
    /// Measured samples collected.
    pub samples: usize,
    /// Measured iterations skipped by the time budget.
    pub skipped: u64,
}

impl StrategyOutcome {
    /// Returns whether the time budget cut this strategy short.
    pub fn is_incomplete(&self) -> bool {
        self.skipped > 0
    }
}

/// A strategy whose result differs from the first strategy of its benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMismatch {
    /// Benchmark name.
    pub benchmark: String,
    /// Reference strategy.
    pub reference: String,
    /// Diverging strategy.
    pub strategy: String,
    /// Reference value.
    pub expected: i64,
    /// Diverging value.
    pub actual: i64,
}

/// Records of one export group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Group name.
    pub group: String,
    /// Summary records of every benchmark in the group.
    pub records: Vec<SummaryRecord>,
}

/// Outcome of writing one group file.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Group name.
    pub group: String,
    /// Destination path.
    pub path: PathBuf,
    /// Rows written, or the failure.
    pub result: Result<usize>,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Start time (RFC 3339).
    pub timestamp: String,
    /// Records grouped by export group, in registration order.
    pub groups: Vec<GroupReport>,
    /// One entry per executed strategy.
    pub outcomes: Vec<StrategyOutcome>,
    /// Result mismatches between strategies of the same benchmark.
    pub mismatches: Vec<ResultMismatch>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            groups: Vec::new(),
            outcomes: Vec::new(),
            mismatches: Vec::new(),
        }
    }

    fn push_record(&mut self, group: &str, record: SummaryRecord) {
        match self.groups.iter_mut().find(|g| g.group == group) {
            Some(existing) => existing.records.push(record),
            None => self.groups.push(GroupReport {
                group: group.to_string(),
                records: vec![record],
            }),
        }
    }

    /// Iterates every summary record.
    pub fn records(&self) -> impl Iterator<Item = &SummaryRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }

    /// Returns the number of summary records.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    /// Strategies cut short by the time budget.
    pub fn incomplete(&self) -> impl Iterator<Item = &StrategyOutcome> {
        self.outcomes.iter().filter(|o| o.is_incomplete())
    }

    /// Returns whether any strategy was cut short.
    pub fn has_incomplete(&self) -> bool {
        self.incomplete().next().is_some()
    }

    /// Fails with the first result mismatch, if any.
    pub fn verify(&self) -> Result<()> {
        match self.mismatches.first() {
            Some(m) => Err(BenchError::ResultMismatch {
                benchmark: m.benchmark.clone(),
                strategy: m.strategy.clone(),
                expected: m.expected,
                actual: m.actual,
            }),
            None => Ok(()),
        }
    }

    /// Writes `<group>-benchmark-results.csv` into `dir` for every group.
    ///
    /// Each destination succeeds or fails on its own; the report itself is
    /// untouched either way.
    pub fn export_groups(&self, dir: &Path, policy: ExportPolicy) -> Vec<ExportOutcome> {
        let dir_ready = std::fs::create_dir_all(dir).map_err(|e| BenchError::export(dir, e));

        self.groups
            .iter()
            .map(|group| {
                let path = dir.join(group_file_name(&group.group));
                let result = match &dir_ready {
                    Ok(()) => export_csv(&group.records, &path, policy),
                    Err(err) => Err(err.clone()),
                };
                match &result {
                    Ok(rows) => info!(
                        group = %group.group,
                        path = %path.display(),
                        rows,
                        "exported results"
                    ),
                    Err(err) => error!(group = %group.group, error = %err, "export failed"),
                }
                ExportOutcome {
                    group: group.group.clone(),
                    path,
                    result,
                }
            })
            .collect()
    }
}

/// File name used for a group's CSV results.
pub fn group_file_name(group: &str) -> String {
    format!("{}-benchmark-results.csv", group)
}

/// Registers benchmarks and runs them under a shared configuration.
pub struct BenchmarkRunner {
    config: BenchConfig,
    benchmarks: Vec<BenchmarkDefinition>,
}

impl BenchmarkRunner {
    /// Creates a runner with the specified configuration.
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            benchmarks: Vec::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Returns the registered benchmarks in registration order.
    pub fn benchmarks(&self) -> &[BenchmarkDefinition] {
        &self.benchmarks
    }

    /// Registers a benchmark.
    ///
    /// # Errors
    ///
    /// Fails when the name is already taken or the definition is invalid,
    /// including parallel strategies with non-associative reductions.
    pub fn register(&mut self, definition: BenchmarkDefinition) -> Result<()> {
        definition.validate()?;
        if self.benchmarks.iter().any(|b| b.name == definition.name) {
            return Err(BenchError::config(
                "benchmark.name",
                format!("benchmark '{}' is already registered", definition.name),
            ));
        }
        self.benchmarks.push(definition);
        Ok(())
    }

    /// Selects benchmarks whose name or group matches any glob pattern.
    /// An empty pattern list selects everything.
    pub fn select<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<&BenchmarkDefinition>> {
        if patterns.is_empty() {
            return Ok(self.benchmarks.iter().collect());
        }

        let compiled = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p.as_ref())
                    .map_err(|e| BenchError::config("patterns", format!("'{}': {}", p.as_ref(), e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let selected: Vec<&BenchmarkDefinition> = self
            .benchmarks
            .iter()
            .filter(|b| {
                compiled
                    .iter()
                    .any(|p| p.matches(&b.name) || p.matches(&b.group))
            })
            .collect();

        if selected.is_empty() {
            let joined: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
            return Err(BenchError::config(
                "patterns",
                format!("no benchmark matches {}", joined.join(", ")),
            ));
        }
        Ok(selected)
    }

    /// Runs every registered benchmark.
    pub fn run_all(&self) -> Result<RunReport> {
        self.run::<&str>(&[])
    }

    /// Runs the benchmarks selected by `patterns`.
    ///
    /// # Errors
    ///
    /// Configuration and strategy contract errors are returned before any
    /// benchmark starts.
    pub fn run<S: AsRef<str>>(&self, patterns: &[S]) -> Result<RunReport> {
        self.config.validate()?;
        let selected = self.select(patterns)?;
        for definition in &selected {
            definition.validate()?;
        }

        let mut report = RunReport::new();
        for definition in selected {
            self.run_benchmark(definition, &mut report)?;
        }
        Ok(report)
    }

    fn run_benchmark(
        &self,
        definition: &BenchmarkDefinition,
        report: &mut RunReport,
    ) -> Result<()> {
        let workload = definition.workload.generate()?;
        let deadline = self.config.time_budget.map(|budget| Instant::now() + budget);
        let mut reference: Option<(String, i64)> = None;

        info!(
            benchmark = %definition.name,
            kind = workload.kind().as_str(),
            size = workload.len(),
            "running benchmark"
        );

        for strategy in &definition.strategies {
            let mut measurement = measure(
                strategy.as_ref(),
                &workload,
                self.config.warmup_iterations,
                self.config.measured_iterations,
            );
            if let Some(deadline) = deadline {
                measurement = measurement.with_deadline(deadline);
            }
            let run = measurement.finish()?;

            debug!(
                benchmark = %definition.name,
                strategy = strategy.name(),
                samples = run.samples.len(),
                warmups = run.warmups_completed,
                value = ?run.value,
                "measured strategy"
            );

            if run.is_incomplete() {
                warn!(
                    benchmark = %definition.name,
                    strategy = strategy.name(),
                    completed = run.samples.len(),
                    skipped = run.skipped,
                    "time budget exhausted, remaining iterations skipped"
                );
            }

            if let Some(value) = run.value {
                match &reference {
                    None => reference = Some((strategy.name().to_string(), value)),
                    Some((reference_name, expected)) if *expected != value => {
                        warn!(
                            benchmark = %definition.name,
                            strategy = strategy.name(),
                            expected,
                            actual = value,
                            "strategy result differs from reference"
                        );
                        report.mismatches.push(ResultMismatch {
                            benchmark: definition.name.clone(),
                            reference: reference_name.clone(),
                            strategy: strategy.name().to_string(),
                            expected: *expected,
                            actual: value,
                        });
                    }
                    Some(_) => {}
                }
            }

            if !run.samples.is_empty() {
                for &mode in self.config.output_mode.modes() {
                    let record = summarize(
                        &definition.name,
                        strategy.name(),
                        &run.samples,
                        mode,
                        self.config.unit,
                    )?;
                    info!(
                        benchmark = %record.benchmark,
                        strategy = %record.strategy,
                        mode = record.mode.as_str(),
                        score = record.score,
                        unit = record.unit.label(),
                        "summary"
                    );
                    report.push_record(&definition.group, record);
                }
            }

            report.outcomes.push(StrategyOutcome {
                benchmark: definition.name.clone(),
                strategy: strategy.name().to_string(),
                kind: strategy.kind(),
                value: run.value,
                samples: run.samples.len(),
                skipped: run.skipped,
            });
        }
        Ok(())
    }
}

/// Builds a runner with the `list-sum`, `map-sum` and `set-sum` benchmarks,
/// each comparing the three standard strategies on a sum pipeline.
pub fn standard_suite(config: BenchConfig) -> Result<BenchmarkRunner> {
    config.validate()?;
    let pool = WorkerPool::new(config.resolved_worker_threads())?;
    let size = config.workload_size;
    let mut runner = BenchmarkRunner::new(config);

    for kind in CollectionKind::all() {
        let definition = BenchmarkDefinition::new(
            format!("{}-sum", kind.as_str()),
            kind.as_str(),
            WorkloadSpec::new(kind, size),
        )
        .with_strategies(standard_strategies(Pipeline::sum(), pool.clone())?);
        runner.register(definition)?;
    }
    Ok(runner)
}
