//! Measurement sinks: where per-file metrics end up.
//!
//! The orchestrator reports three metrics per successfully classified
//! file. What happens to them (persisted, printed, aggregated) is up to the
//! [`MeasurementSink`] implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use super::stats::LineCounts;

/// A per-file metric reported to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Lines opening, inside or closing a comment
    CommentLines,
    /// Non-comment, non-blank lines
    LinesOfCode,
    /// Every line in the file
    TotalLines,
}

impl Metric {
    /// Metrics reported for every measured file, in reporting order.
    pub const ALL: [Metric; 3] = [Metric::CommentLines, Metric::LinesOfCode, Metric::TotalLines];

    /// Human-readable metric name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::CommentLines => "comment lines",
            Metric::LinesOfCode => "lines of code",
            Metric::TotalLines => "total lines",
        }
    }

    /// Short stable key, as used by code-quality servers.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::CommentLines => "comment_lines",
            Metric::LinesOfCode => "ncloc",
            Metric::TotalLines => "lines",
        }
    }

    /// Pick this metric's value out of a set of line counts.
    pub fn value_of(&self, counts: &LineCounts) -> u64 {
        match self {
            Metric::CommentLines => counts.comment_lines(),
            Metric::LinesOfCode => counts.code_lines(),
            Metric::TotalLines => counts.total_lines(),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives `(file, metric, value)` measurements.
///
/// Sinks are shared across the orchestrator and its callers, so they must
/// be thread-safe. Idempotency and persistence are the sink's concern.
pub trait MeasurementSink: Send + Sync {
    fn save(&self, file: &Path, metric: Metric, value: u64);
}

impl<F> MeasurementSink for F
where
    F: Fn(&Path, Metric, u64) + Send + Sync,
{
    fn save(&self, file: &Path, metric: Metric, value: u64) {
        self(file, metric, value)
    }
}

/// Forward every metric for one file's counts to `sink`.
pub fn save_counts(sink: &dyn MeasurementSink, file: &Path, counts: &LineCounts) {
    for metric in Metric::ALL {
        sink.save(file, metric, metric.value_of(counts));
    }
}

/// One recorded measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measure {
    pub path: PathBuf,
    pub metric: Metric,
    pub value: u64,
}

/// All metrics recorded for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileMeasures {
    pub path: PathBuf,
    pub comment_lines: u64,
    pub lines_of_code: u64,
    pub total_lines: u64,
}

impl FileMeasures {
    fn set(&mut self, metric: Metric, value: u64) {
        match metric {
            Metric::CommentLines => self.comment_lines = value,
            Metric::LinesOfCode => self.lines_of_code = value,
            Metric::TotalLines => self.total_lines = value,
        }
    }
}

/// In-memory sink that keeps every measurement it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    measures: Mutex<Vec<Measure>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all measurements, in arrival order.
    pub fn measures(&self) -> Vec<Measure> {
        self.measures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded measurements.
    pub fn len(&self) -> usize {
        self.measures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Measurements grouped by file, sorted by path.
    pub fn per_file(&self) -> Vec<FileMeasures> {
        let mut by_path: BTreeMap<PathBuf, FileMeasures> = BTreeMap::new();
        for m in self.measures() {
            by_path
                .entry(m.path.clone())
                .or_insert_with(|| FileMeasures {
                    path: m.path.clone(),
                    ..Default::default()
                })
                .set(m.metric, m.value);
        }
        by_path.into_values().collect()
    }
}

impl MeasurementSink for CollectingSink {
    fn save(&self, file: &Path, metric: Metric, value: u64) {
        self.measures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Measure {
                path: file.to_path_buf(),
                metric,
                value,
            });
    }
}
