//! Run-scoped progress reporting for enrichment batches.
//!
//! Each run owns a [`ProgressReporter`]; any number of [`ProgressHandle`]s can
//! poll the latest [`ProgressState`] without blocking the run. A
//! [`ProgressRegistry`] makes handles reachable by [`RunId`] for pollers that
//! only know the id.

use std::fmt;

use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Snapshot of a run's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Records processed so far (1-based index of the last one).
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Identifier of one enrichment run, e.g. `20261016T091502-3fa9c1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn generate() -> Self {
        let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
        Self(format!(
            "{}-{:06x}",
            chrono::Utc::now().format("%Y%m%dT%H%M%S"),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Write side of a run's progress.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<ProgressState>,
}

impl ProgressReporter {
    pub fn update(&self, current: usize, total: usize, message: impl Into<String>) {
        self.tx.send_replace(ProgressState {
            current,
            total,
            message: message.into(),
        });
    }

    pub fn subscribe(&self) -> ProgressHandle {
        ProgressHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of a run's progress. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    rx: watch::Receiver<ProgressState>,
}

impl ProgressHandle {
    /// Latest state, without waiting.
    pub fn poll(&self) -> ProgressState {
        self.rx.borrow().clone()
    }

    /// Whether the run's reporter has been dropped.
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }

    /// Waits for the next update. Returns `false` once the run's reporter
    /// has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Creates a connected reporter/handle pair starting at the default state.
pub fn channel() -> (ProgressReporter, ProgressHandle) {
    let (tx, rx) = watch::channel(ProgressState::default());
    (ProgressReporter { tx }, ProgressHandle { rx })
}

/// Progress handles of active runs, keyed by run id.
#[derive(Debug, Default)]
pub struct ProgressRegistry {
    runs: DashMap<RunId, ProgressHandle>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a run, first evicting runs whose reporter is gone.
    pub fn register(&self, id: RunId, handle: ProgressHandle) {
        self.prune_closed();
        self.runs.insert(id, handle);
    }

    /// Removes runs whose reporter has been dropped, returning how many.
    pub fn prune_closed(&self) -> usize {
        let before = self.runs.len();
        self.runs.retain(|_, handle| !handle.is_closed());
        before - self.runs.len()
    }

    pub fn poll(&self, id: &RunId) -> Option<ProgressState> {
        self.runs.get(id).map(|h| h.poll())
    }

    /// Removes a run, returning its final state.
    pub fn finish(&self, id: &RunId) -> Option<ProgressState> {
        self.runs.remove(id).map(|(_, h)| h.poll())
    }

    pub fn active_runs(&self) -> Vec<RunId> {
        self.runs.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
