//! The concurrent multi-file pipeline.
//!
//! [`run`] fans filenames out to a bounded pool of worker threads over a
//! rendezvous channel, fans per-file value sequences back in over a result
//! channel, and merges them single-threadedly before applying the selected
//! [`Operation`]. The first error observed on the error channel terminates
//! the run; abandoned workers exit on their own once the channel receivers
//! are dropped.

mod observer;

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, select};

use crate::column::column_values;
use crate::error::{StatsError, StatsResult};
use crate::stats::Operation;

pub use observer::{
    PipelineEvent, PipelineMetrics, PipelineMetricsSnapshot, PipelineObserver,
    StdErrPipelineObserver,
};

/// Configuration for [`run`].
///
/// Use [`Default`] for common cases.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Number of worker threads.
    ///
    /// If `None`, uses the platform's available parallelism. Any positive
    /// worker count produces the same final result; only wall-clock time
    /// differs.
    pub num_workers: Option<usize>,
    /// Optional observer for pipeline events.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Optional shared handle to real-time run metrics.
    pub metrics: Option<Arc<PipelineMetrics>>,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("num_workers", &self.num_workers)
            .field("observer_set", &self.observer.is_some())
            .field("metrics_set", &self.metrics.is_some())
            .finish()
    }
}

/// Compute one statistic over `column` across all `filenames` and write its
/// decimal form (plus a trailing newline) to `out`.
///
/// `operation` is one of the fixed tokens `"sum"` or `"avg"`; `column` is
/// 1-based. Validation (non-empty file list, positive column, known
/// operation) happens before any file is opened, so those errors never race
/// with worker errors.
///
/// Files are processed concurrently; merge order across files is
/// nondeterministic, which is fine because both reductions are commutative
/// and associative over the merged set. The first error from any worker is
/// returned as-is and nothing is written to `out`.
///
/// # Panics
///
/// Panics if `opts.num_workers` is `Some(0)`.
pub fn run<W: Write>(
    filenames: &[PathBuf],
    operation: &str,
    column: usize,
    out: &mut W,
    opts: &RunOptions,
) -> StatsResult<()> {
    if filenames.is_empty() {
        return Err(StatsError::NoFiles);
    }
    if column < 1 {
        return Err(StatsError::InvalidColumn(column));
    }
    let operation: Operation = operation.parse()?;

    if let Some(n) = opts.num_workers {
        assert!(n > 0, "num_workers must be > 0 when set");
    }
    let num_workers = opts
        .num_workers
        .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

    let metrics = opts
        .metrics
        .clone()
        .unwrap_or_else(|| Arc::new(PipelineMetrics::new()));

    let start = Instant::now();
    metrics.begin_run();
    emit(
        opts,
        PipelineEvent::RunStarted {
            files: filenames.len(),
            workers: num_workers,
        },
    );

    // Rendezvous channels: send and receive meet with no buffering, so a
    // worker cannot run ahead of the merge loop.
    let (task_tx, task_rx) = bounded::<PathBuf>(0);
    let (result_tx, result_rx) = bounded::<Vec<f64>>(0);
    let (err_tx, err_rx) = bounded::<StatsError>(0);
    let (done_tx, done_rx) = bounded::<()>(0);

    // Distributor: feed filenames in input order, then close the task
    // channel by dropping the only sender. A failed send means every worker
    // has already exited.
    let files: Vec<PathBuf> = filenames.to_vec();
    thread::spawn(move || {
        for fname in files {
            if task_tx.send(fname).is_err() {
                break;
            }
        }
    });

    let mut workers = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let task_rx = task_rx.clone();
        let result_tx = result_tx.clone();
        let err_tx = err_tx.clone();
        workers.push(thread::spawn(move || {
            for fname in task_rx {
                let file = match File::open(&fname) {
                    Ok(file) => file,
                    Err(source) => {
                        let _ = err_tx.send(StatsError::FileOpen {
                            path: fname,
                            source,
                        });
                        return;
                    }
                };

                // The handle is owned by this worker and closed on drop,
                // success or failure.
                match column_values(file, column - 1) {
                    Ok(values) => {
                        if result_tx.send(values).is_err() {
                            // The merge loop is gone; the run already failed.
                            return;
                        }
                    }
                    Err(err) => {
                        if err_tx.send(err).is_err() {
                            return;
                        }
                    }
                }
            }
        }));
    }

    // Supervisor: raise the completion signal once every worker has drained
    // its share of the task channel.
    thread::spawn(move || {
        for handle in workers {
            let _ = handle.join();
        }
        let _ = done_tx.send(());
    });

    // The merge loop keeps the original `result_tx`/`err_tx` alive, so those
    // channels never disconnect while we are selecting; the arms below only
    // ever see data or the done signal.
    let mut merged: Vec<f64> = Vec::new();
    loop {
        select! {
            recv(err_rx) -> msg => {
                if let Ok(err) = msg {
                    // First error wins. In-flight workers are abandoned;
                    // their pending sends fail once the receivers drop.
                    emit(opts, PipelineEvent::RunFailed);
                    return Err(err);
                }
            }
            recv(result_rx) -> msg => {
                if let Ok(values) = msg {
                    metrics.on_result_merged(values.len());
                    emit(opts, PipelineEvent::ResultMerged { values: values.len() });
                    merged.extend(values);
                }
            }
            recv(done_rx) -> _ => {
                let value = operation.apply(&merged);
                if let Err(source) = writeln!(out, "{value}") {
                    emit(opts, PipelineEvent::RunFailed);
                    return Err(StatsError::Write(source));
                }

                let elapsed = start.elapsed();
                metrics.end_run(elapsed);
                emit(
                    opts,
                    PipelineEvent::RunFinished {
                        elapsed,
                        metrics: metrics.snapshot(),
                    },
                );
                return Ok(());
            }
        }
    }
}

fn emit(opts: &RunOptions, event: PipelineEvent) {
    if let Some(obs) = &opts.observer {
        obs.on_event(&event);
    }
}
