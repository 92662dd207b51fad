//! Source discovery: find files to analyze.
//!
//! This module handles the first stage of the pipeline - discovering what
//! files to measure. It provides:
//!
//! - **File filtering**: Select files by suffix and include/exclude globs
//! - **File handles**: The `SourceFile` trait and its on-disk implementation
//! - **Project provider**: `ProjectFiles`, the set of files under a root
//!
//! ## Example
//!
//! ```rust,ignore
//! use cfloclib::source::{FilterConfig, ProjectFiles};
//!
//! let filter = FilterConfig::new().exclude("**/vendor/**")?;
//! let files = ProjectFiles::new(".", filter).input_files()?;
//! ```

pub mod file;
pub mod filter;

pub use file::{DiskFile, ProjectFiles, SourceFile};
pub use filter::{discover_files, parse_suffixes, FilterConfig, DEFAULT_SUFFIXES};
