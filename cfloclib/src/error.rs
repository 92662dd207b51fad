//! Error types for cfloclib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or measuring files
#[derive(Error, Debug)]
pub enum CflocError {
    /// Failed to open or read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Suffix list parsed to nothing
    #[error("no file suffixes configured")]
    NoSuffixes,

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The wait for outstanding tasks was interrupted by the host
    #[error("measurement interrupted while waiting for workers")]
    Interrupted,

    /// A worker thread could not be started
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(std::io::Error),

    /// An external analysis step failed
    #[error("analysis step '{name}' failed: {message}")]
    Step { name: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
