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

//! CSV export of summary records.
//!
//! One header row followed by one row per record:
//!
//! ```text
//! benchmark,strategy,mode,score,unit,samples
//! list-sum,sequential-loop,average-time,1.734,ms/op,10
//! ```

use crate::config::ExportPolicy;
use crate::error::{BenchError, Result};
use crate::harness::stats::SummaryRecord;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Column names, in order.
pub const CSV_HEADER: [&str; 6] = ["benchmark", "strategy", "mode", "score", "unit", "samples"];

#[derive(Serialize)]
struct CsvRow<'a> {
    benchmark: &'a str,
    strategy: &'a str,
    mode: &'a str,
    score: f64,
    unit: &'a str,
    samples: usize,
}

impl<'a> From<&'a SummaryRecord> for CsvRow<'a> {
    fn from(record: &'a SummaryRecord) -> Self {
        Self {
            benchmark: &record.benchmark,
            strategy: &record.strategy,
            mode: record.mode.as_str(),
            score: record.score,
            unit: record.unit.label(),
            samples: record.samples,
        }
    }
}

/// Writes `records` to `writer`, preceded by the header row when
/// `include_header` is set.
pub fn write_records<W: Write>(
    records: &[SummaryRecord],
    writer: W,
    include_header: bool,
) -> std::result::Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    if include_header {
        wtr.write_record(CSV_HEADER)?;
    }
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders `records` with a header row.
pub fn to_csv_string(records: &[SummaryRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(records, &mut buffer, true)
        .map_err(|e| BenchError::export(Path::new("<memory>"), e))?;
    String::from_utf8(buffer).map_err(|e| BenchError::export(Path::new("<memory>"), e))
}

/// Writes `records` to `path` and returns the number of data rows written.
///
/// [`ExportPolicy::Overwrite`] replaces the file. [`ExportPolicy::Append`]
/// adds rows to an existing file and writes the header only when the file is
/// new or empty.
///
/// # Errors
///
/// Returns [`BenchError::Export`] when the destination cannot be written or
/// when appending to a file whose first row is not the expected header.
pub fn export_csv(records: &[SummaryRecord], path: &Path, policy: ExportPolicy) -> Result<usize> {
    let (file, include_header) = match policy {
        ExportPolicy::Overwrite => {
            let file = File::create(path).map_err(|e| BenchError::export(path, e))?;
            (file, true)
        }
        ExportPolicy::Append => {
            let is_empty = match std::fs::metadata(path) {
                Ok(meta) => meta.len() == 0,
                Err(e) if e.kind() == io::ErrorKind::NotFound => true,
                Err(e) => return Err(BenchError::export(path, e)),
            };
            if !is_empty {
                check_header(path)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| BenchError::export(path, e))?;
            (file, is_empty)
        }
    };

    write_records(records, io::BufWriter::new(file), include_header)
        .map_err(|e| BenchError::export(path, e))?;
    Ok(records.len())
}

fn check_header(path: &Path) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| BenchError::export(path, e))?;

    let mut first = csv::StringRecord::new();
    let found = reader
        .read_record(&mut first)
        .map_err(|e| BenchError::export(path, e))?;

    if found && first.iter().eq(CSV_HEADER.iter().copied()) {
        Ok(())
    } else {
        Err(BenchError::export(
            path,
            format!(
                "existing header '{}' does not match '{}'",
                first.iter().collect::<Vec<_>>().join(","),
                CSV_HEADER.join(",")
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeUnit;
    use crate::harness::stats::Mode;
    use tempfile::TempDir;

    fn record(strategy: &str, score: f64) -> SummaryRecord {
        SummaryRecord {
            benchmark: "list-sum".to_string(),
            strategy: strategy.to_string(),
            mode: Mode::AverageTime,
            score,
            unit: TimeUnit::Milliseconds,
            samples: 10,
            distribution: None,
        }
    }

    #[test]
    fn test_to_csv_string() {
        let csv = to_csv_string(&[record("sequential-loop", 1.5)]).unwrap();
        assert_eq!(
            csv,
            "benchmark,strategy,mode,score,unit,samples\nlist-sum,sequential-loop,average-time,1.5,ms/op,10\n"
        );
    }

    #[test]
    fn test_empty_records_write_header_only() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv, "benchmark,strategy,mode,score,unit,samples\n");
    }

    #[test]
    fn test_overwrite_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list-benchmark-results.csv");

        export_csv(&[record("a", 1.0), record("b", 2.0)], &path, ExportPolicy::Overwrite).unwrap();
        export_csv(&[record("c", 3.0)], &path, ExportPolicy::Overwrite).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains(",c,"));
        assert!(!content.contains(",a,"));
    }

    #[test]
    fn test_append_keeps_single_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map-benchmark-results.csv");

        export_csv(&[record("a", 1.0)], &path, ExportPolicy::Append).unwrap();
        export_csv(&[record("b", 2.0)], &path, ExportPolicy::Append).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.matches("benchmark,strategy").count(), 1);
    }

    #[test]
    fn test_append_rejects_foreign_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("set-benchmark-results.csv");
        std::fs::write(&path, "name,value\nx,1\n").unwrap();

        let err = export_csv(&[record("a", 1.0)], &path, ExportPolicy::Append).unwrap_err();
        assert!(matches!(err, BenchError::Export { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name,value\nx,1\n");
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = export_csv(&[record("a", 1.0)], &path, ExportPolicy::Overwrite).unwrap_err();
        assert!(matches!(err, BenchError::Export { .. }));
    }
}
