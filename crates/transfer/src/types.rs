//! Shared types for the upload engine.

use std::time::Duration;

use docferry_protocol::FinalizeData;

use crate::validation::ValidationError;

/// Limits applied when files are added to a batch.
#[derive(Debug, Clone)]
pub struct BatchLimits {
    /// Maximum number of tasks in a batch.
    pub max_files: usize,
    /// Maximum size of a single file in bytes.
    pub max_file_size: u64,
    /// Lowercase extensions accepted for upload.
    pub accepted_extensions: Vec<String>,
    /// Chunk size in bytes for the transfer plan.
    pub chunk_size: u64,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 50 * 1024 * 1024,
            accepted_extensions: ["pdf", "doc", "docx", "txt", "md", "html"]
                .into_iter()
                .map(String::from)
                .collect(),
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// How `run_all` schedules tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// One task at a time, in batch order. Bounds client-side bandwidth and
    /// keeps progress reporting simple.
    #[default]
    Sequential,
    /// Up to `n` tasks in flight at once.
    Concurrent(usize),
}

/// A file rejected during pre-flight screening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: ValidationError,
}

/// Progress and lifecycle events emitted by the transfer engine.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Byte-level progress for a task.
    Progress {
        task_id: String,
        uploaded_bytes: u64,
        total_bytes: u64,
        /// Overall task progress, 0–100.
        percent: u8,
    },
    /// An automatic retry was scheduled after a transfer failure.
    Retrying {
        task_id: String,
        attempt: u32,
        delay: Duration,
    },
    /// The task finished; the backend registered the document.
    Completed {
        task_id: String,
        result: FinalizeData,
    },
    /// The task exhausted its retries.
    Failed { task_id: String, error: String },
}
