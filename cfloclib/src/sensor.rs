//! The ColdFusion sensor: external analysis steps followed by line metrics.
//!
//! A code-quality run first lets an external linter write its report into a
//! work directory (through [`AnalysisStep`]s), then measures every project
//! file. The two halves share nothing but the work directory: a failing
//! step is logged and the measurement still runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::data::{measure_files, MeasureOptions, MeasureReport, MeasurementSink};
use crate::source::ProjectFiles;
use crate::Result;

/// Language key the sensor runs on.
pub const LANGUAGE_KEY: &str = "cf";
/// Display name of the language.
pub const LANGUAGE_NAME: &str = "ColdFusion";
/// Linter configuration written into the work directory.
pub const CONFIG_FILE_NAME: &str = "cflint-config.xml";
/// Linter report read back from the work directory.
pub const RESULT_FILE_NAME: &str = "cflint-result.xml";

/// A step run against the work directory before measuring.
///
/// Typical steps write the linter configuration, run the linter and import
/// its XML report.
pub trait AnalysisStep {
    fn name(&self) -> &str;

    fn run(&self, work_dir: &Path) -> Result<()>;
}

/// An [`AnalysisStep`] backed by a closure.
pub struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> FnStep<F>
where
    F: Fn(&Path) -> Result<()>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> AnalysisStep for FnStep<F>
where
    F: Fn(&Path) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, work_dir: &Path) -> Result<()> {
        (self.f)(work_dir)
    }
}

/// Outcome of a sensor run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SensorReport {
    /// Names of the steps that failed
    pub failed_steps: Vec<String>,
    /// Measurement summary
    pub measure: MeasureReport,
}

/// Runs the external steps, cleans the work directory and measures.
pub struct Sensor {
    project: ProjectFiles,
    work_dir: PathBuf,
    steps: Vec<Box<dyn AnalysisStep>>,
    options: MeasureOptions,
}

impl Sensor {
    pub fn new(project: ProjectFiles, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            project,
            work_dir: work_dir.into(),
            steps: Vec::new(),
            options: MeasureOptions::default(),
        }
    }

    /// Append a step; steps run in the order they were added.
    pub fn step(mut self, step: impl AnalysisStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Set the measurement options.
    pub fn options(mut self, options: MeasureOptions) -> Self {
        self.options = options;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run every step, then measure the project into `sink`.
    ///
    /// Step failures are reported in [`SensorReport::failed_steps`]. Errors
    /// are returned only for file discovery and for an interrupted
    /// measurement.
    pub fn execute(&self, sink: &dyn MeasurementSink) -> Result<SensorReport> {
        let mut report = SensorReport::default();

        if !self.steps.is_empty() {
            for step in &self.steps {
                match step.run(&self.work_dir) {
                    Ok(()) => info!(step = step.name(), "analysis step done"),
                    Err(e) => {
                        error!(step = step.name(), "analysis step failed: {e}");
                        report.failed_steps.push(step.name().to_string());
                    }
                }
            }
            self.clean_work_dir();
        }

        let files = self.project.input_files()?;
        info!(
            language = LANGUAGE_NAME,
            files = files.len(),
            "starting measurement"
        );
        report.measure = measure_files(files, sink, &self.options)?;

        Ok(report)
    }

    /// Remove the linter's configuration and report files.
    fn clean_work_dir(&self) {
        for name in [CONFIG_FILE_NAME, RESULT_FILE_NAME] {
            let path = self.work_dir.join(name);
            if let Err(e) = remove_if_exists(&path) {
                warn!(file = %path.display(), "could not remove work file: {e}");
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
