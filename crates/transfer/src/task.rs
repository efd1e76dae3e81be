//! Per-file upload task and its state machine.
//!
//! A task owns its source file and an immutable chunk plan. State lives
//! behind an `RwLock` so the engine, the batch, and UI snapshots can share
//! one `Arc<UploadTask>`. Every (re)start mints a fresh cancellation token;
//! an in-flight operation holding the previous token observes it cancelled
//! and must not touch task state, because whoever cancelled already wrote
//! the transition it wanted.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use docferry_protocol::{DocumentMetadata, FinalizeData};

use crate::chunker::{ChunkSpan, chunk_spans};
use crate::source::SourceFile;

/// Lifecycle states of an upload task.
///
/// Serialized in SCREAMING_SNAKE_CASE for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Idle,
    Uploading,
    Paused,
    Success,
    Error,
    Cancelled,
}

impl TaskState {
    /// `true` once the task can make no further progress without a manual
    /// retry.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskState::Success | TaskState::Error | TaskState::Cancelled
        )
    }
}

/// Point-in-time view of a task, for stats and UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: String,
    pub file_name: String,
    pub state: TaskState,
    pub message: String,
    pub current_chunk: u32,
    pub total_chunks: u32,
    pub uploaded_bytes: u64,
    pub total_bytes: u64,
    pub retry_count: u32,
    pub error: Option<String>,
    pub result: Option<FinalizeData>,
}

/// One file's transfer record (thread-safe).
pub struct UploadTask {
    inner: RwLock<TaskInner>,
}

struct TaskInner {
    id: String,
    file: Arc<SourceFile>,
    spans: Arc<Vec<ChunkSpan>>,
    chunk_size: u64,
    metadata: Option<DocumentMetadata>,
    state: TaskState,
    message: String,
    /// Cursor into the chunk plan: index of the next unacknowledged chunk.
    current_chunk: u32,
    uploaded_bytes: u64,
    retry_count: u32,
    result: Option<FinalizeData>,
    error: Option<String>,
    cancel: CancellationToken,
    created_at: DateTime<Utc>,
}

impl UploadTask {
    /// Creates an idle task with an immutable chunk plan.
    pub fn new(
        file: SourceFile,
        chunk_size: u64,
        metadata: Option<DocumentMetadata>,
    ) -> Arc<Self> {
        let created_at = Utc::now();
        let id = generate_id(created_at);
        let chunk_size = if chunk_size == 0 {
            crate::DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        let spans = Arc::new(chunk_spans(file.size(), chunk_size));
        Arc::new(Self {
            inner: RwLock::new(TaskInner {
                id,
                file: Arc::new(file),
                spans,
                chunk_size,
                metadata,
                state: TaskState::Idle,
                message: "Waiting to upload".into(),
                current_chunk: 0,
                uploaded_bytes: 0,
                retry_count: 0,
                result: None,
                error: None,
                cancel: CancellationToken::new(),
                created_at,
            }),
        })
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Moves the task into `Uploading` and mints a fresh cancellation token.
    ///
    /// Valid from `Idle` (start), `Paused` (resume), and `Error` (automatic
    /// retry); the chunk cursor is preserved. Returns `None` (a no-op) if
    /// the task is already uploading or finished for good.
    pub fn begin(&self) -> Option<CancellationToken> {
        let mut t = self.inner.write().unwrap();
        match t.state {
            TaskState::Idle | TaskState::Paused | TaskState::Error => {
                t.state = TaskState::Uploading;
                t.error = None;
                t.message = format!("Uploading {}", t.file.name());
                t.cancel = CancellationToken::new();
                Some(t.cancel.clone())
            }
            TaskState::Uploading | TaskState::Success | TaskState::Cancelled => None,
        }
    }

    /// Pauses an uploading task, cancelling the in-flight chunk request.
    ///
    /// The cursor stays at the last unacknowledged chunk: no partial-chunk
    /// credit.
    pub fn pause(&self) -> bool {
        let mut t = self.inner.write().unwrap();
        if t.state != TaskState::Uploading {
            return false;
        }
        t.cancel.cancel();
        t.state = TaskState::Paused;
        t.message = "Paused".into();
        true
    }

    /// Cancels the task (terminal). Valid from any non-finished state and
    /// from `Error` (aborting a pending automatic retry).
    pub fn cancel(&self) -> bool {
        let mut t = self.inner.write().unwrap();
        match t.state {
            TaskState::Success | TaskState::Cancelled => false,
            _ => {
                t.cancel.cancel();
                t.state = TaskState::Cancelled;
                t.message = "Cancelled".into();
                true
            }
        }
    }

    /// Manual retry from `Error` or `Cancelled`: back to `Idle` with the
    /// cursor, byte count, retry count, and error all reset.
    pub fn reset(&self) -> bool {
        let mut t = self.inner.write().unwrap();
        if !matches!(t.state, TaskState::Error | TaskState::Cancelled) {
            return false;
        }
        t.state = TaskState::Idle;
        t.current_chunk = 0;
        t.uploaded_bytes = 0;
        t.retry_count = 0;
        t.error = None;
        t.result = None;
        t.message = "Waiting to upload".into();
        true
    }

    /// Marks the task successful with the backend's acknowledgment.
    pub fn complete(&self, result: FinalizeData) {
        let mut t = self.inner.write().unwrap();
        t.state = TaskState::Success;
        t.uploaded_bytes = t.file.size();
        t.result = Some(result);
        t.error = None;
        t.message = "Upload complete".into();
    }

    /// Marks the task failed with a transfer error message.
    pub fn fail(&self, error: impl Into<String>) {
        let mut t = self.inner.write().unwrap();
        let error = error.into();
        t.state = TaskState::Error;
        t.message = format!("Upload failed: {error}");
        t.error = Some(error);
        t.result = None;
    }

    // -----------------------------------------------------------------------
    // Progress bookkeeping
    // -----------------------------------------------------------------------

    /// Acknowledges completion of all chunks below `next`: advances the
    /// cursor and credits the completed chunks' bytes.
    pub fn advance_cursor(&self, next: u32) {
        let mut t = self.inner.write().unwrap();
        t.current_chunk = next;
        t.uploaded_bytes = (next as u64 * t.chunk_size).min(t.file.size());
    }

    /// Records fractional progress within chunk `index`: `sent` bytes of the
    /// chunk are on the wire.
    ///
    /// Returns `(uploaded_bytes, percent)` for event emission, or `None` if
    /// the task is no longer uploading (a stale callback after pause or
    /// cancel must not move the numbers).
    pub fn record_chunk_progress(&self, index: u32, sent: u64) -> Option<(u64, u8)> {
        let mut t = self.inner.write().unwrap();
        if t.state != TaskState::Uploading {
            return None;
        }
        let total = t.file.size();
        t.uploaded_bytes = (index as u64 * t.chunk_size + sent).min(total);

        let total_chunks = t.spans.len() as u32;
        let percent = overall_percent(&t.spans, index, sent, total_chunks);
        t.message = format!("Uploading chunk {} of {}", index + 1, total_chunks);
        Some((t.uploaded_bytes, percent))
    }

    /// Increments the automatic-retry counter and returns the new value.
    pub fn bump_retry(&self) -> u32 {
        let mut t = self.inner.write().unwrap();
        t.retry_count += 1;
        t.retry_count
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> String {
        self.inner.read().unwrap().id.clone()
    }

    pub fn state(&self) -> TaskState {
        self.inner.read().unwrap().state
    }

    pub fn file(&self) -> Arc<SourceFile> {
        Arc::clone(&self.inner.read().unwrap().file)
    }

    pub fn spans(&self) -> Arc<Vec<ChunkSpan>> {
        Arc::clone(&self.inner.read().unwrap().spans)
    }

    pub fn metadata(&self) -> Option<DocumentMetadata> {
        self.inner.read().unwrap().metadata.clone()
    }

    pub fn current_chunk(&self) -> u32 {
        self.inner.read().unwrap().current_chunk
    }

    pub fn uploaded_bytes(&self) -> u64 {
        self.inner.read().unwrap().uploaded_bytes
    }

    pub fn total_bytes(&self) -> u64 {
        self.inner.read().unwrap().file.size()
    }

    pub fn retry_count(&self) -> u32 {
        self.inner.read().unwrap().retry_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.read().unwrap().created_at
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let t = self.inner.read().unwrap();
        TaskSnapshot {
            id: t.id.clone(),
            file_name: t.file.name().to_string(),
            state: t.state,
            message: t.message.clone(),
            current_chunk: t.current_chunk,
            total_chunks: t.spans.len() as u32,
            uploaded_bytes: t.uploaded_bytes,
            total_bytes: t.file.size(),
            retry_count: t.retry_count,
            error: t.error.clone(),
            result: t.result.clone(),
        }
    }
}

/// Overall task progress: `round(((i + chunk_fraction) / total_chunks) * 100)`.
fn overall_percent(spans: &[ChunkSpan], index: u32, sent: u64, total_chunks: u32) -> u8 {
    if total_chunks == 0 {
        return 100;
    }
    let span_len = spans
        .get(index as usize)
        .map(|s| s.len)
        .unwrap_or(1)
        .max(1);
    let fraction = sent.min(span_len) as f64 / span_len as f64;
    let percent = ((index as f64 + fraction) / total_chunks as f64) * 100.0;
    percent.round().min(100.0) as u8
}

/// Unix-millis prefix plus a random suffix; unique within a session.
fn generate_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..8])
}
