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

//! Aggregation pipelines and reductions.
//!
//! A [`Pipeline`] is an optional filter, an optional map and a
//! [`Reduction`]. The same reduction folds elements into a partial and
//! merges partials together, so only reductions declared associative and
//! commutative may be decomposed across workers.

use std::fmt;
use std::sync::Arc;

/// Element predicate.
pub type Predicate = Arc<dyn Fn(i64) -> bool + Send + Sync>;

/// Element transformation.
pub type Mapper = Arc<dyn Fn(i64) -> i64 + Send + Sync>;

/// Binary combine operator.
pub type Combiner = Arc<dyn Fn(i64, i64) -> i64 + Send + Sync>;

/// Declared algebraic properties of a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// Grouping and ordering do not change the result.
    AssociativeCommutative,
    /// Nothing can be assumed; parallel decomposition is undefined.
    Unknown,
}

/// A named combine operator with its identity element.
#[derive(Clone)]
pub struct Reduction {
    name: String,
    identity: i64,
    combine: Combiner,
    associativity: Associativity,
}

impl Reduction {
    /// Wrapping integer sum.
    pub fn sum() -> Self {
        Self::associative("sum", 0, i64::wrapping_add)
    }

    /// Minimum value (`i64::MAX` when nothing passes the filter).
    pub fn min() -> Self {
        Self::associative("min", i64::MAX, std::cmp::min)
    }

    /// Maximum value (`i64::MIN` when nothing passes the filter).
    pub fn max() -> Self {
        Self::associative("max", i64::MIN, std::cmp::max)
    }

    /// Bitwise exclusive or.
    pub fn xor() -> Self {
        Self::associative("xor", 0, |a, b| a ^ b)
    }

    /// A user reduction declared associative and commutative by the caller.
    pub fn associative<F>(name: impl Into<String>, identity: i64, combine: F) -> Self
    where
        F: Fn(i64, i64) -> i64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            identity,
            combine: Arc::new(combine),
            associativity: Associativity::AssociativeCommutative,
        }
    }

    /// A user reduction with no declared properties. Sequential strategies
    /// accept it; parallel strategies reject it.
    pub fn custom<F>(name: impl Into<String>, identity: i64, combine: F) -> Self
    where
        F: Fn(i64, i64) -> i64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            identity,
            combine: Arc::new(combine),
            associativity: Associativity::Unknown,
        }
    }

    /// Returns the reduction name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identity element.
    pub fn identity(&self) -> i64 {
        self.identity
    }

    /// Returns the declared associativity.
    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    /// Returns whether the reduction may be decomposed across workers.
    pub fn is_parallel_safe(&self) -> bool {
        self.associativity == Associativity::AssociativeCommutative
    }

    /// Applies the combine operator.
    #[inline]
    pub fn apply(&self, acc: i64, value: i64) -> i64 {
        (self.combine)(acc, value)
    }
}

impl fmt::Debug for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reduction")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("associativity", &self.associativity)
            .finish()
    }
}

/// Filter -> map -> reduce aggregation applied by every strategy.
///
/// # Example
///
/// ```
/// use aggbench::strategy::{Pipeline, Reduction};
///
/// let evens_doubled = Pipeline::new(Reduction::sum())
///     .with_filter(|v| v % 2 == 0)
///     .with_map(|v| v * 2);
/// assert_eq!(evens_doubled.step(0, 4), 8);
/// assert_eq!(evens_doubled.step(0, 3), 0);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    filter: Option<Predicate>,
    map: Option<Mapper>,
    reduction: Reduction,
}

impl Pipeline {
    /// Creates a pipeline that reduces every element unchanged.
    pub fn new(reduction: Reduction) -> Self {
        Self {
            filter: None,
            map: None,
            reduction,
        }
    }

    /// Sum of all elements.
    pub fn sum() -> Self {
        Self::new(Reduction::sum())
    }

    /// Number of elements passing the filter.
    pub fn count() -> Self {
        Self::new(Reduction::sum()).with_map(|_| 1)
    }

    /// Keeps only elements matching `filter`.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(i64) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Transforms each kept element with `map`.
    pub fn with_map<F>(mut self, map: F) -> Self
    where
        F: Fn(i64) -> i64 + Send + Sync + 'static,
    {
        self.map = Some(Arc::new(map));
        self
    }

    /// Returns the reduction.
    pub fn reduction(&self) -> &Reduction {
        &self.reduction
    }

    /// Returns the reduction identity.
    #[inline]
    pub fn identity(&self) -> i64 {
        self.reduction.identity
    }

    /// Returns whether `value` passes the filter.
    #[inline]
    pub fn accept(&self, value: i64) -> bool {
        self.filter.as_ref().map_or(true, |f| f(value))
    }

    /// Applies the map stage.
    #[inline]
    pub fn transform(&self, value: i64) -> i64 {
        self.map.as_ref().map_or(value, |m| m(value))
    }

    /// Combines two reduced values.
    #[inline]
    pub fn combine(&self, acc: i64, value: i64) -> i64 {
        self.reduction.apply(acc, value)
    }

    /// Folds one raw element into an accumulator.
    #[inline]
    pub fn step(&self, acc: i64, value: i64) -> i64 {
        if self.accept(value) {
            self.combine(acc, self.transform(value))
        } else {
            acc
        }
    }

    /// Short description such as `filter|map|sum`.
    pub fn describe(&self) -> String {
        let mut stages = Vec::with_capacity(3);
        if self.filter.is_some() {
            stages.push("filter");
        }
        if self.map.is_some() {
            stages.push("map");
        }
        stages.push(self.reduction.name());
        stages.join("|")
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.describe())
            .field("reduction", &self.reduction)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_reductions_are_parallel_safe() {
        for reduction in [Reduction::sum(), Reduction::min(), Reduction::max(), Reduction::xor()] {
            assert!(reduction.is_parallel_safe(), "{}", reduction.name());
        }
    }

    #[test]
    fn test_custom_reduction_is_unknown() {
        let subtract = Reduction::custom("subtract", 0, |a, b| a - b);
        assert_eq!(subtract.associativity(), Associativity::Unknown);
        assert!(!subtract.is_parallel_safe());
        assert_eq!(subtract.apply(10, 3), 7);
    }

    #[test]
    fn test_sum_wraps() {
        assert_eq!(Reduction::sum().apply(i64::MAX, 1), i64::MIN);
    }

    #[test]
    fn test_pipeline_step() {
        let pipeline = Pipeline::sum().with_filter(|v| v > 2).with_map(|v| v * 10);
        assert_eq!(pipeline.step(5, 1), 5);
        assert_eq!(pipeline.step(5, 3), 35);
    }

    #[test]
    fn test_count_pipeline() {
        let pipeline = Pipeline::count();
        let total = (0..7).fold(pipeline.identity(), |acc, v| pipeline.step(acc, v));
        assert_eq!(total, 7);
        // Merging two partial counts must add them, not count them.
        assert_eq!(pipeline.combine(3, 4), 7);
    }

    #[test]
    fn test_describe() {
        assert_eq!(Pipeline::sum().describe(), "sum");
        assert_eq!(
            Pipeline::new(Reduction::max()).with_filter(|_| true).describe(),
            "filter|max"
        );
    }
}
