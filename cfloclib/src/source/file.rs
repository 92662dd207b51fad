//! Readable source file handles and the project file provider.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;

use super::filter::{discover_files, FilterConfig};

/// A readable text resource identified by its path.
///
/// Handles are shared with worker threads, so implementations must be
/// `Send + Sync`. The measurement core only ever reads through `open`.
pub trait SourceFile: Send + Sync {
    /// Identity of the file.
    fn path(&self) -> &Path;

    /// Open a fresh buffered stream over the file's content.
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>>;
}

/// A source file on the local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskFile {
    path: PathBuf,
}

impl DiskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceFile for DiskFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}

/// Enumerates the source files of a project.
///
/// This is the file-system provider handed to the orchestrator: every file
/// under `root` accepted by `filter`.
#[derive(Debug, Clone)]
pub struct ProjectFiles {
    pub root: PathBuf,
    pub filter: FilterConfig,
}

impl ProjectFiles {
    pub fn new(root: impl Into<PathBuf>, filter: FilterConfig) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    /// Paths of all matching files, sorted.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        discover_files(&self.root, &self.filter)
    }

    /// Handles for all matching files, in path order.
    pub fn input_files(&self) -> Result<Vec<Arc<dyn SourceFile>>> {
        Ok(self
            .paths()?
            .into_iter()
            .map(|p| Arc::new(DiskFile::new(p)) as Arc<dyn SourceFile>)
            .collect())
    }
}
