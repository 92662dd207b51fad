//! Output formatting: present metrics as tables.
//!
//! This module handles the final stage of the pipeline - formatting
//! measurements for display. It provides:
//!
//! - **MetricsTable**: Table-ready data with headers, rows, and footer
//! - **TableRow**: Individual row with label and formatted values
//!
//! MetricsTable is a pure presentation layer - it only formats data into
//! strings.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cfloclib::output::MetricsTable;
//!
//! let table = MetricsTable::from_measures(&sink.per_file(), root, true);
//! // table.headers: ["File", "Code", "Comments", "Total"]
//! // table.footer: TableRow { label: "Total (5 files)", ... }
//! ```

pub mod table;

pub use table::{MetricsTable, TableRow};
