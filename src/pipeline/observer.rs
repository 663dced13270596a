use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Events emitted by the pipeline orchestrator.
///
/// All events come from the single orchestrator thread; workers never call
/// into the observer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RunStarted { files: usize, workers: usize },
    ResultMerged { values: usize },
    RunFailed,
    RunFinished {
        elapsed: Duration,
        metrics: PipelineMetricsSnapshot,
    },
}

/// Observer hook for pipeline events.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// A simple stderr logger for pipeline events.
#[derive(Default)]
pub struct StdErrPipelineObserver;

impl PipelineObserver for StdErrPipelineObserver {
    fn on_event(&self, event: &PipelineEvent) {
        eprintln!("{event:?}");
    }
}

/// Real-time metrics for a pipeline run.
///
/// The orchestrator updates these counters while merging; callers can
/// snapshot them at any time through [`crate::pipeline::RunOptions`].
pub struct PipelineMetrics {
    files_merged: AtomicU64,
    values_merged: AtomicU64,
    elapsed_ns: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            files_merged: AtomicU64::new(0),
            values_merged: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
        }
    }

    pub(crate) fn begin_run(&self) {
        self.files_merged.store(0, Ordering::SeqCst);
        self.values_merged.store(0, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_result_merged(&self, values: usize) {
        let _ = self.files_merged.fetch_add(1, Ordering::SeqCst);
        let _ = self.values_merged.fetch_add(values as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        PipelineMetricsSnapshot {
            elapsed,
            files_merged: self.files_merged.load(Ordering::SeqCst),
            values_merged: self.values_merged.load(Ordering::SeqCst),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`PipelineMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub elapsed: Option<Duration>,
    pub files_merged: u64,
    pub values_merged: u64,
}

impl fmt::Display for PipelineMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files_merged={}, values_merged={}, elapsed={:?}",
            self.files_merged, self.values_merged, self.elapsed
        )
    }
}
