//! Logging setup and run counters

use crate::config::LogLevel;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to every target.
pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.as_filter().into()));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Counters for one worker run
#[derive(Debug, Default)]
pub struct Metrics {
    artifacts_uploaded: AtomicU64,
    artifacts_reused: AtomicU64,
    submissions: AtomicU64,
    tasks_skipped: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact_uploaded(&self) {
        self.artifacts_uploaded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "artifacts_uploaded", "Metric incremented");
    }

    pub fn artifact_reused(&self) {
        self.artifacts_reused.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "artifacts_reused", "Metric incremented");
    }

    pub fn submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "submissions", "Metric incremented");
    }

    pub fn task_skipped(&self) {
        self.tasks_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_skipped", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            artifacts_uploaded: self.artifacts_uploaded.load(Ordering::Relaxed),
            artifacts_reused: self.artifacts_reused.load(Ordering::Relaxed),
            submissions: self.submissions.load(Ordering::Relaxed),
            tasks_skipped: self.tasks_skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub artifacts_uploaded: u64,
    pub artifacts_reused: u64,
    pub submissions: u64,
    pub tasks_skipped: u64,
}
