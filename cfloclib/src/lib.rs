//! # cfloclib
//!
//! Line metrics for ColdFusion sources: comment lines, code lines and total
//! lines per file, measured concurrently.
//!
//! ## Overview
//!
//! The library is a small pipeline:
//!
//! - **source**: find `.cfc`/`.cfm` files, filtered by suffix and glob
//! - **data**: classify each file's lines and fan the work out over a fixed
//!   worker pool bounded by a batch deadline
//! - **sensor**: run external analysis steps, then measure a project
//! - **output**: turn collected measures into a printable table
//!
//! ## Classification
//!
//! Lines are classified by a line-oriented scan that only knows the
//! `<!--` and `-->` comment markers:
//!
//! - **Comment**: a line that opens, continues or closes a comment span
//! - **Blank**: a whitespace-only line outside comments
//! - **Code**: everything else
//!
//! A comment marker inside a string literal still counts as a comment. This
//! is a known imprecision of a counter that does not parse the language.
//!
//! ## Example
//!
//! ```rust
//! use cfloclib::{classify_str, measure_files, CollectingSink, FilterConfig,
//!     MeasureOptions, ProjectFiles};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! // Classify a single snippet
//! let counts = classify_str("<cfset a = 1>\n<!--- note --->\n\n");
//! assert_eq!(counts.code_lines(), 1);
//! assert_eq!(counts.comment_lines(), 1);
//! assert_eq!(counts.blank_lines(), 1);
//!
//! // Measure a whole project
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("index.cfm"), "<cfoutput>hi</cfoutput>\n").unwrap();
//! let files = ProjectFiles::new(dir.path(), FilterConfig::new()).input_files().unwrap();
//!
//! let sink = CollectingSink::new();
//! let report = measure_files(files, &sink, &MeasureOptions::new()).unwrap();
//! assert_eq!(report.measured, 1);
//! assert_eq!(sink.per_file()[0].total_lines, 1);
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod sensor;
pub mod source;

pub use data::{
    classify, classify_path, classify_str, interrupt_channel, measure_files, save_counts,
    CollectingSink, FileMeasures, InterruptHandle, InterruptSignal, LineCounts, Measure,
    MeasureOptions, MeasureReport, MeasurementSink, Metric, TaskOutcome,
};
pub use error::CflocError;
pub use output::{MetricsTable, TableRow};
pub use sensor::{AnalysisStep, FnStep, Sensor, SensorReport};
pub use source::{discover_files, DiskFile, FilterConfig, ProjectFiles, SourceFile};

/// Result type for cfloclib operations
pub type Result<T> = std::result::Result<T, CflocError>;
