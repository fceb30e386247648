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

//! Error types for benchmark configuration, execution and export.
//!
//! Configuration and associativity errors are raised before any timing
//! starts. Export errors carry the destination path so callers can report
//! them per file while keeping the in-memory results.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum workload size accepted by the generator (50 million elements).
///
/// Keeps a mistyped size from exhausting memory before the first iteration.
pub const MAX_WORKLOAD_SIZE: usize = 50_000_000;

/// Result type for benchmarking operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while configuring, running or exporting benchmarks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// Invalid configuration parameter (iteration counts, sizes, pool sizes, selections).
    #[error("Invalid configuration parameter '{parameter}': {reason}")]
    Configuration {
        /// Parameter name
        parameter: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Aggregation was attempted on an empty sample sequence.
    #[error("Insufficient samples for {benchmark}/{strategy}: at least one measured iteration is required")]
    InsufficientSamples {
        /// Benchmark name
        benchmark: String,
        /// Strategy name
        strategy: String,
    },

    /// A parallel strategy was requested with a reduction whose associativity is not declared.
    #[error("Strategy '{strategy}' cannot run reduction '{reduction}' in parallel: the reduction is not declared associative and commutative")]
    NonAssociativeReduction {
        /// Strategy name
        strategy: String,
        /// Reduction name
        reduction: String,
    },

    /// Writing results to a destination failed.
    #[error("Failed to export results to '{path}': {message}")]
    Export {
        /// Destination path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Two strategies of one benchmark produced different results.
    #[error("Strategy '{strategy}' of benchmark '{benchmark}' returned {actual}, expected {expected}")]
    ResultMismatch {
        /// Benchmark name
        benchmark: String,
        /// Strategy name
        strategy: String,
        /// Result of the reference strategy
        expected: i64,
        /// Result of this strategy
        actual: i64,
    },
}

impl BenchError {
    /// Creates a configuration error.
    pub fn config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        BenchError::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates an export error for `path`.
    pub fn export(path: &Path, message: impl ToString) -> Self {
        BenchError::Export {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Returns whether this error was raised before any measurement started.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            BenchError::Configuration { .. } | BenchError::NonAssociativeReduction { .. }
        )
    }
}

/// Validate that a workload size is non-zero and within acceptable limits.
///
/// # Examples
///
/// ```
/// use aggbench::error::{validate_workload_size, MAX_WORKLOAD_SIZE};
///
/// assert!(validate_workload_size(1000).is_ok());
/// assert!(validate_workload_size(0).is_err());
/// assert!(validate_workload_size(MAX_WORKLOAD_SIZE + 1).is_err());
/// ```
#[inline]
pub fn validate_workload_size(size: usize) -> Result<()> {
    if size == 0 {
        Err(BenchError::config("workload_size", "must be at least 1"))
    } else if size > MAX_WORKLOAD_SIZE {
        Err(BenchError::config(
            "workload_size",
            format!("{} exceeds maximum of {}", size, MAX_WORKLOAD_SIZE),
        ))
    } else {
        Ok(())
    }
}
