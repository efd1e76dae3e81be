//! Resumable chunked document uploads.
//!
//! A file accepted into an [`UploadBatch`] becomes an [`UploadTask`] with an
//! immutable chunk plan. The [`TransferEngine`] drives each task through its
//! chunks sequentially over a [`ChunkTransport`], finalizes the upload on the
//! backend, and retries failed tasks with linear backoff. Pause, resume,
//! cancel, and manual retry are cooperative via a per-start cancellation
//! token.

mod batch;
mod chunker;
mod engine;
mod retry;
mod source;
mod stats;
mod task;
mod types;
mod validation;

pub use batch::UploadBatch;
pub use chunker::{ChunkSpan, chunk_count, chunk_spans};
pub use engine::{ChunkProgressFn, ChunkTransport, TransferEngine};
pub use retry::RetryPolicy;
pub use source::{FileData, SourceFile};
pub use stats::BatchStats;
pub use task::{TaskSnapshot, TaskState, UploadTask};
pub use types::{BatchLimits, Rejection, SchedulePolicy, UploadEvent};
pub use validation::{ValidationError, screen_files};

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk or finalize call failed for network/server reasons.
    #[error("transport error: {0}")]
    Transport(String),

    /// The in-flight operation's token was invalidated by pause or cancel.
    /// Not a failure; whoever cancelled already owns the state transition.
    #[error("cancelled")]
    Cancelled,

    #[error("upload failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl TransferError {
    /// Returns `true` for the cooperative-cancellation variant.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferError::Cancelled)
    }
}
