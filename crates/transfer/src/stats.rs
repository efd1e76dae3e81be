//! Aggregate statistics over a batch of tasks.

use serde::Serialize;

use crate::task::{TaskSnapshot, TaskState};

/// Derived, not stored: counts per state plus byte totals, folded from task
/// snapshots on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub idle: usize,
    pub uploading: usize,
    pub paused: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub total_bytes: u64,
    pub uploaded_bytes: u64,
}

impl BatchStats {
    /// Folds snapshots into aggregate counts.
    pub fn collect(snapshots: impl IntoIterator<Item = TaskSnapshot>) -> Self {
        let mut stats = Self::default();
        for snap in snapshots {
            stats.total += 1;
            stats.total_bytes += snap.total_bytes;
            stats.uploaded_bytes += snap.uploaded_bytes;
            match snap.state {
                TaskState::Idle => stats.idle += 1,
                TaskState::Uploading => stats.uploading += 1,
                TaskState::Paused => stats.paused += 1,
                TaskState::Success => stats.succeeded += 1,
                TaskState::Error => stats.failed += 1,
                TaskState::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    /// Fraction of the batch's bytes already uploaded, 0.0–1.0.
    /// 0.0 when the batch is empty.
    pub fn overall_progress(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.uploaded_bytes as f64 / self.total_bytes as f64
        }
    }
}
