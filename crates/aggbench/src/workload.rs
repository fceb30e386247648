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

//! Workload generation.
//!
//! A [`Workload`] is the immutable input every strategy aggregates: the
//! values `0..size` held in a list, a hash map (key `i` -> value `i`) or a
//! hash set. Contents are deterministic for a given size, so a correct sum
//! always equals [`Workload::expected_sum`]. List iteration order is the
//! generation order; map and set iteration order is whatever the hash
//! container yields.

use crate::error::{validate_workload_size, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map, hash_set, HashMap, HashSet};

/// Shape of the collection holding the workload values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    /// Contiguous vector.
    List,
    /// Hash map, aggregated over its values.
    Map,
    /// Hash set.
    Set,
}

impl CollectionKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::List => "list",
            CollectionKind::Map => "map",
            CollectionKind::Set => "set",
        }
    }

    /// All collection kinds, in suite order.
    pub fn all() -> [CollectionKind; 3] {
        [CollectionKind::List, CollectionKind::Map, CollectionKind::Set]
    }
}

#[derive(Debug, Clone)]
enum Storage {
    List(Vec<i64>),
    Map(HashMap<i64, i64>),
    Set(HashSet<i64>),
}

/// A fixed-size, read-only collection of integers.
#[derive(Debug, Clone)]
pub struct Workload {
    kind: CollectionKind,
    storage: Storage,
}

impl Workload {
    /// Generates the list workload `0..size`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for `size == 0` or sizes above
    /// [`MAX_WORKLOAD_SIZE`](crate::error::MAX_WORKLOAD_SIZE).
    ///
    /// # Example
    ///
    /// ```
    /// use aggbench::Workload;
    ///
    /// let workload = Workload::generate(4).unwrap();
    /// assert_eq!(workload.values().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    /// ```
    pub fn generate(size: usize) -> Result<Self> {
        Self::generate_kind(CollectionKind::List, size)
    }

    /// Generates the values `0..size` in a collection of the given kind.
    pub fn generate_kind(kind: CollectionKind, size: usize) -> Result<Self> {
        validate_workload_size(size)?;
        let upper = size as i64;
        let storage = match kind {
            CollectionKind::List => Storage::List((0..upper).collect()),
            CollectionKind::Map => Storage::Map((0..upper).map(|i| (i, i)).collect()),
            CollectionKind::Set => Storage::Set((0..upper).collect()),
        };
        Ok(Self { kind, storage })
    }

    /// Returns the collection kind.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::List(v) => v.len(),
            Storage::Map(m) => m.len(),
            Storage::Set(s) => s.len(),
        }
    }

    /// Returns whether the workload holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all values, `size * (size - 1) / 2`.
    pub fn expected_sum(&self) -> i64 {
        let n = self.len() as i64;
        n * (n - 1) / 2
    }

    /// Iterates the values sequentially.
    pub fn values(&self) -> Values<'_> {
        match &self.storage {
            Storage::List(v) => Values::List(v.iter()),
            Storage::Map(m) => Values::Map(m.values()),
            Storage::Set(s) => Values::Set(s.iter()),
        }
    }

    /// Partitions the workload and folds every partition independently on
    /// the current rayon pool, returning one partial result per partition.
    ///
    /// Lists are split into chunks of `partition_len` elements. Hash
    /// containers are split by rayon along their internal buckets and
    /// `partition_len` is not used. Partials come back in no guaranteed order.
    pub fn fold_partitions<T, ID, F>(&self, partition_len: usize, identity: ID, fold: F) -> Vec<T>
    where
        T: Send,
        ID: Fn() -> T + Sync + Send,
        F: Fn(T, i64) -> T + Sync + Send,
    {
        match &self.storage {
            Storage::List(v) => v
                .par_chunks(partition_len.max(1))
                .map(|chunk| chunk.iter().copied().fold(identity(), &fold))
                .collect(),
            Storage::Map(m) => m
                .par_iter()
                .map(|(_, value)| *value)
                .fold(&identity, &fold)
                .collect(),
            Storage::Set(s) => s.par_iter().copied().fold(&identity, &fold).collect(),
        }
    }
}

/// Sequential iterator over workload values.
pub enum Values<'a> {
    /// List values in order.
    List(std::slice::Iter<'a, i64>),
    /// Map values.
    Map(hash_map::Values<'a, i64, i64>),
    /// Set members.
    Set(hash_set::Iter<'a, i64>),
}

impl Iterator for Values<'_> {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        match self {
            Values::List(it) => it.next().copied(),
            Values::Map(it) => it.next().copied(),
            Values::Set(it) => it.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Values::List(it) => it.size_hint(),
            Values::Map(it) => it.size_hint(),
            Values::Set(it) => it.size_hint(),
        }
    }
}

/// Kind and size of a workload, generated fresh for every benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Collection kind.
    pub kind: CollectionKind,
    /// Number of elements.
    pub size: usize,
}

impl WorkloadSpec {
    /// Creates a workload description.
    pub fn new(kind: CollectionKind, size: usize) -> Self {
        Self { kind, size }
    }

    /// Generates the described workload.
    pub fn generate(&self) -> Result<Workload> {
        Workload::generate_kind(self.kind, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    #[test]
    fn test_generate_list_is_ordered() {
        let workload = Workload::generate(1_000).unwrap();
        assert_eq!(workload.len(), 1_000);
        assert_eq!(workload.kind(), CollectionKind::List);
        assert!(workload.values().eq(0..1_000));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let a = Workload::generate(5_000).unwrap();
        let b = Workload::generate(5_000).unwrap();
        assert!(a.values().eq(b.values()));
    }

    #[test]
    fn test_generate_zero_rejected() {
        let err = Workload::generate(0).unwrap_err();
        assert!(matches!(err, BenchError::Configuration { .. }));
    }

    #[test]
    fn test_hash_kinds_hold_same_values() {
        for kind in [CollectionKind::Map, CollectionKind::Set] {
            let workload = Workload::generate_kind(kind, 500).unwrap();
            let mut values: Vec<i64> = workload.values().collect();
            values.sort_unstable();
            assert_eq!(values, (0..500).collect::<Vec<_>>(), "kind {:?}", kind);
        }
    }

    #[test]
    fn test_expected_sum() {
        let workload = Workload::generate(1_000_000).unwrap();
        assert_eq!(workload.expected_sum(), 499_999_500_000);
        assert_eq!(Workload::generate(1).unwrap().expected_sum(), 0);
    }

    #[test]
    fn test_fold_partitions_covers_every_value() {
        for kind in CollectionKind::all() {
            let workload = Workload::generate_kind(kind, 10_000).unwrap();
            let partials = workload.fold_partitions(1_000, || 0i64, |acc, v| acc + v);
            assert_eq!(partials.iter().sum::<i64>(), workload.expected_sum());

            let counts = workload.fold_partitions(1_000, || 0usize, |acc, _| acc + 1);
            assert_eq!(counts.iter().sum::<usize>(), 10_000);
        }
    }

    #[test]
    fn test_list_partition_count() {
        let workload = Workload::generate(10_000).unwrap();
        let partials = workload.fold_partitions(3_000, || 0i64, |acc, v| acc + v);
        assert_eq!(partials.len(), 4);
    }
}
