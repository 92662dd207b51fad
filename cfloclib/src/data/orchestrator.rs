//! Concurrent measurement of a file set.
//!
//! Files are classified on a fixed-size pool of worker threads that compete
//! for jobs on a shared channel. The caller's thread collects outcomes and
//! forwards metrics to the sink until every task has reported or the
//! batch deadline passes.
//!
//! Per-file failures never escape a task: an unreadable file (or a panic
//! while scanning it) becomes a skipped outcome and its siblings carry on.
//! Deadline expiry is not an error either; whatever finished in time is
//! reported and the rest is abandoned.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{at, never, select, unbounded, Receiver, Sender};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::CflocError;
use crate::source::SourceFile;
use crate::Result;

use super::classifier::classify;
use super::sink::{save_counts, MeasurementSink};
use super::stats::LineCounts;

/// Worker count used when none is configured.
pub const DEFAULT_POOL_SIZE: usize = 2;
/// Batch deadline used when none is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Options for a measurement run.
#[derive(Debug, Clone)]
pub struct MeasureOptions {
    /// Number of worker threads (at least one is always used)
    pub pool_size: usize,
    /// Wall-clock bound for the whole batch
    pub deadline: Duration,
    /// Optional host signal that stops the wait early
    pub interrupt: Option<InterruptSignal>,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            deadline: DEFAULT_DEADLINE,
            interrupt: None,
        }
    }
}

impl MeasureOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn pool_size(mut self, workers: usize) -> Self {
        self.pool_size = workers;
        self
    }

    /// Set the batch deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Stop waiting when `signal` fires.
    pub fn interrupt(mut self, signal: InterruptSignal) -> Self {
        self.interrupt = Some(signal);
        self
    }

    fn workers(&self) -> usize {
        self.pool_size.max(1)
    }
}

/// Sending half of an interrupt channel, held by the host.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    tx: Sender<()>,
}

impl InterruptHandle {
    /// Ask a running measurement to stop waiting.
    pub fn interrupt(&self) {
        // A closed channel means no run is listening any more.
        let _ = self.tx.send(());
    }
}

/// Receiving half of an interrupt channel, passed in `MeasureOptions`.
#[derive(Debug, Clone)]
pub struct InterruptSignal {
    rx: Receiver<()>,
}

/// Create a connected interrupt handle and signal.
///
/// Only interrupts sent while a run is waiting count. Anything sent before
/// `measure_files` starts (or left over from a previous run) is discarded,
/// so one `MeasureOptions` can be reused across runs.
pub fn interrupt_channel() -> (InterruptHandle, InterruptSignal) {
    let (tx, rx) = unbounded();
    (InterruptHandle { tx }, InterruptSignal { rx })
}

/// Result of one classification task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The file was read and classified
    Measured { path: PathBuf, counts: LineCounts },
    /// The file produced no measurement
    Skipped { path: PathBuf, reason: String },
}

/// Summary of a measurement run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeasureReport {
    /// Tasks submitted to the pool (one per file)
    pub submitted: usize,
    /// Files whose metrics reached the sink
    pub measured: usize,
    /// Files that failed to read or scan
    pub skipped: usize,
    /// Tasks still queued or running when the wait ended
    pub abandoned: usize,
    /// Whether the batch deadline cut the wait short
    pub timed_out: bool,
    /// Wall-clock time spent, in milliseconds
    pub elapsed_ms: u64,
}

type Job = Arc<dyn SourceFile>;

/// Fixed set of worker threads fed from one job queue.
struct WorkerPool {
    jobs: Option<Sender<Job>>,
    results: Receiver<TaskOutcome>,
    abandoned: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn start(workers: usize) -> Result<Self> {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (result_tx, result_rx) = unbounded::<TaskOutcome>();
        let abandoned = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let abandoned = Arc::clone(&abandoned);
            let handle = thread::Builder::new()
                .name(format!("cfloc-worker-{idx}"))
                .spawn(move || worker_loop(jobs, results, abandoned))
                .map_err(CflocError::WorkerSpawn)?;
            handles.push(handle);
        }

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            abandoned,
            handles,
        })
    }

    fn submit(&self, job: Job) -> bool {
        self.jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(job).is_ok())
    }

    /// No more jobs; workers exit once the queue drains.
    fn close(&mut self) {
        self.jobs.take();
    }

    /// Wait for every worker to finish.
    fn join(mut self) {
        self.close();
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("worker thread exited abnormally");
            }
        }
    }

    /// Stop taking queued jobs and detach the workers.
    fn abandon(mut self) {
        self.abandoned.store(true, Ordering::Release);
        self.close();
    }
}

fn worker_loop(jobs: Receiver<Job>, results: Sender<TaskOutcome>, abandoned: Arc<AtomicBool>) {
    for file in jobs.iter() {
        if abandoned.load(Ordering::Acquire) {
            break;
        }
        if results.send(run_task(file.as_ref())).is_err() {
            break;
        }
    }
}

/// Classify one file, absorbing any failure into the outcome.
fn run_task(file: &dyn SourceFile) -> TaskOutcome {
    let path = file.path().to_path_buf();
    let scan = panic::catch_unwind(AssertUnwindSafe(|| {
        file.open().and_then(|reader| classify(reader))
    }));

    match scan {
        Ok(Ok(counts)) => TaskOutcome::Measured { path, counts },
        Ok(Err(e)) => TaskOutcome::Skipped {
            path,
            reason: e.to_string(),
        },
        Err(_) => TaskOutcome::Skipped {
            path,
            reason: "classification panicked".to_string(),
        },
    }
}

/// What woke the collecting thread up.
enum Wake {
    Outcome(TaskOutcome),
    WorkersGone,
    Interrupted,
    SignalDropped,
    Deadline,
}

/// Hand finished outcomes to the sink and tally them.
fn forward(outcomes: Vec<TaskOutcome>, sink: &dyn MeasurementSink, report: &mut MeasureReport) {
    for outcome in outcomes {
        match outcome {
            TaskOutcome::Measured { path, counts } => {
                debug!(file = %path.display(), ?counts, "measured");
                save_counts(sink, &path, &counts);
                report.measured += 1;
            }
            TaskOutcome::Skipped { path, reason } => {
                warn!(file = %path.display(), %reason, "skipping file");
                report.skipped += 1;
            }
        }
    }
}

/// Measure every file and forward the metrics to `sink`.
///
/// One task is submitted per file, in iteration order. The wait for
/// results ends when all tasks have reported or when `options.deadline`
/// has elapsed, whichever comes first; completion order across files is
/// unspecified. Every outcome that finished before the wait ended is then
/// forwarded, so a slow sink never eats into the deadline. Failed files
/// are logged and skipped.
///
/// The only error conditions are an interrupt from the host while waiting
/// ([`CflocError::Interrupted`]) and a failure to start worker threads.
/// Outcomes collected before an interrupt are still forwarded.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cfloclib::{measure_files, CollectingSink, DiskFile, MeasureOptions, SourceFile};
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// let path = dir.path().join("index.cfm");
/// std::fs::write(&path, "<!--- greeting --->\n<cfoutput>hi</cfoutput>\n").unwrap();
///
/// let files: Vec<Arc<dyn SourceFile>> = vec![Arc::new(DiskFile::new(&path))];
/// let sink = CollectingSink::new();
/// let options = MeasureOptions::new().pool_size(2).deadline(Duration::from_secs(10));
///
/// let report = measure_files(files, &sink, &options).unwrap();
/// assert_eq!(report.measured, 1);
/// assert_eq!(sink.per_file()[0].lines_of_code, 1);
/// ```
pub fn measure_files(
    files: impl IntoIterator<Item = Arc<dyn SourceFile>>,
    sink: &dyn MeasurementSink,
    options: &MeasureOptions,
) -> Result<MeasureReport> {
    let started = Instant::now();
    let mut report = MeasureReport::default();

    let mut files = files.into_iter().peekable();
    if files.peek().is_none() {
        debug!("no files to measure");
        return Ok(report);
    }

    let mut interrupt = match &options.interrupt {
        Some(signal) => {
            let stale = signal.rx.try_iter().count();
            if stale > 0 {
                debug!(stale, "discarding interrupts sent before the run");
            }
            signal.rx.clone()
        }
        None => never(),
    };

    let workers = options.workers();
    let mut pool = WorkerPool::start(workers)?;
    info!(workers, "starting measure processor");

    for file in files {
        if !pool.submit(file) {
            break;
        }
        report.submitted += 1;
    }
    pool.close();

    let timer = match started.checked_add(options.deadline) {
        Some(when) => at(when),
        None => never(),
    };

    let mut finished = Vec::with_capacity(report.submitted);
    while finished.len() < report.submitted {
        let wake = select! {
            recv(pool.results) -> msg => msg.map_or(Wake::WorkersGone, Wake::Outcome),
            recv(interrupt) -> sig => if sig.is_ok() { Wake::Interrupted } else { Wake::SignalDropped },
            recv(timer) -> _ => Wake::Deadline,
        };

        match wake {
            Wake::Outcome(outcome) => finished.push(outcome),
            Wake::SignalDropped => interrupt = never(),
            Wake::Interrupted => {
                finished.extend(pool.results.try_iter());
                error!(
                    pending = report.submitted - finished.len(),
                    "measure processor interrupted"
                );
                pool.abandon();
                forward(finished, sink, &mut report);
                return Err(CflocError::Interrupted);
            }
            Wake::Deadline => {
                // Outcomes that raced the timer still count as finished.
                finished.extend(pool.results.try_iter());
                report.timed_out = finished.len() < report.submitted;
                break;
            }
            Wake::WorkersGone => break,
        }
    }

    report.abandoned = report.submitted - finished.len();
    if report.abandoned == 0 {
        pool.join();
    } else {
        if report.timed_out {
            warn!(
                abandoned = report.abandoned,
                deadline = ?options.deadline,
                "deadline reached before all files were measured"
            );
        }
        pool.abandon();
    }

    forward(finished, sink, &mut report);

    report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        measured = report.measured,
        skipped = report.skipped,
        abandoned = report.abandoned,
        "measure processor done"
    );

    Ok(report)
}
