//! Data collection: classify files and report metrics.
//!
//! This module handles the second stage of the pipeline - scanning source
//! files and delivering per-file metrics. It provides:
//!
//! - **Classification**: Line-oriented comment/blank/code classifier
//! - **Statistics**: `LineCounts`, whose code count is always the residual
//! - **Orchestration**: Bounded worker pool with a batch deadline
//! - **Sinks**: Where the `comment lines`, `lines of code` and `total lines`
//!   metrics go
//!
//! ## Example
//!
//! ```rust,ignore
//! use cfloclib::data::{measure_files, CollectingSink, MeasureOptions};
//!
//! let sink = CollectingSink::new();
//! let report = measure_files(files, &sink, &MeasureOptions::new())?;
//! println!("measured {} files", report.measured);
//! ```

pub mod classifier;
pub mod orchestrator;
pub mod sink;
pub mod stats;

pub use classifier::{classify, classify_path, classify_str, COMMENT_CLOSE, COMMENT_OPEN};
pub use orchestrator::{
    interrupt_channel, measure_files, InterruptHandle, InterruptSignal, MeasureOptions,
    MeasureReport, TaskOutcome, DEFAULT_DEADLINE, DEFAULT_POOL_SIZE,
};
pub use sink::{save_counts, CollectingSink, FileMeasures, Measure, MeasurementSink, Metric};
pub use stats::LineCounts;
