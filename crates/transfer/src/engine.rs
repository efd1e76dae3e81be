//! Transfer engine: drives one task through its chunk plan and finalize call.
//!
//! The transport seam is a trait so the engine stays decoupled from HTTP and
//! testable with mocks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use docferry_protocol::{ChunkUploadRequest, FinalizeData, FinalizeRequest};

use crate::chunker::ChunkSpan;
use crate::retry::RetryPolicy;
use crate::source::SourceFile;
use crate::task::{TaskState, UploadTask};
use crate::types::UploadEvent;
use crate::TransferError;

/// Callback reporting how many bytes of the current chunk are on the wire.
pub type ChunkProgressFn<'a> = &'a (dyn Fn(u64) + Send + Sync);

/// Uploads chunks and finalizes uploads on the backend.
///
/// Implemented over HTTP by the client crate; tests use in-memory mocks.
pub trait ChunkTransport: Send + Sync {
    /// Sends one chunk and waits for the backend's acknowledgment.
    fn send_chunk<'a>(
        &'a self,
        request: ChunkUploadRequest,
        on_progress: ChunkProgressFn<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransferError>> + Send + 'a>>;

    /// Asks the backend to assemble and register the document.
    ///
    /// Must be idempotent from the caller's perspective: a repeat call for an
    /// already-finalized task returns success, and the engine treats any
    /// success as terminal.
    fn finalize<'a>(
        &'a self,
        request: FinalizeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinalizeData, TransferError>> + Send + 'a>>;
}

/// Runs upload tasks over a [`ChunkTransport`], applying the retry policy
/// and emitting [`UploadEvent`]s.
pub struct TransferEngine {
    transport: Arc<dyn ChunkTransport>,
    retry: RetryPolicy,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
}

impl TransferEngine {
    /// Creates an engine with the given transport and retry policy.
    pub fn new(transport: Arc<dyn ChunkTransport>, retry: RetryPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            transport,
            retry,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Runs a task to completion, pause, cancellation, or retry exhaustion.
    ///
    /// Starting a task that is already uploading (or finished) is a no-op.
    /// Returns `Ok(())` when the task was paused or cancelled: the state was
    /// already written by whoever cancelled the token.
    pub async fn run(&self, task: &Arc<UploadTask>) -> Result<(), TransferError> {
        let Some(mut token) = task.begin() else {
            debug!(task = %task.id(), state = ?task.state(), "start ignored");
            return Ok(());
        };
        info!(
            task = %task.id(),
            file = %task.file().name(),
            chunks = task.spans().len(),
            "upload started"
        );

        loop {
            match self.attempt(task, &token).await {
                Ok(result) => {
                    task.complete(result.clone());
                    info!(task = %task.id(), document = %result.document_id, "upload complete");
                    let _ = self
                        .events_tx
                        .send(UploadEvent::Completed {
                            task_id: task.id(),
                            result,
                        })
                        .await;
                    return Ok(());
                }
                Err(TransferError::Cancelled) => {
                    // Pause or cancel already owns the state transition.
                    debug!(task = %task.id(), state = ?task.state(), "transfer interrupted");
                    return Ok(());
                }
                Err(e) => {
                    let message = e.to_string();
                    task.fail(message.clone());

                    if task.retry_count() >= self.retry.max_retries {
                        warn!(
                            task = %task.id(),
                            attempts = task.retry_count(),
                            error = %message,
                            "retries exhausted"
                        );
                        let _ = self
                            .events_tx
                            .send(UploadEvent::Failed {
                                task_id: task.id(),
                                error: message.clone(),
                            })
                            .await;
                        return Err(TransferError::RetriesExhausted {
                            attempts: task.retry_count(),
                            last_error: message,
                        });
                    }

                    let attempt = task.bump_retry();
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        task = %task.id(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %message,
                        "transfer failed, retrying"
                    );
                    let _ = self
                        .events_tx
                        .send(UploadEvent::Retrying {
                            task_id: task.id(),
                            attempt,
                            delay,
                        })
                        .await;

                    // The backoff wait aborts if the task is cancelled or
                    // removed in the meantime.
                    tokio::select! {
                        _ = token.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    if task.state() != TaskState::Error {
                        return Ok(());
                    }
                    let Some(next) = task.begin() else {
                        return Ok(());
                    };
                    token = next;
                }
            }
        }
    }

    /// One pass over the remaining chunks plus the finalize call.
    async fn attempt(
        &self,
        task: &Arc<UploadTask>,
        token: &CancellationToken,
    ) -> Result<FinalizeData, TransferError> {
        let file = task.file();
        let spans = task.spans();
        let total_chunks = spans.len() as u32;
        let start = task.current_chunk() as usize;

        for span in spans.iter().skip(start) {
            if token.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            let bytes = read_span_blocking(&file, *span).await?;

            let request = ChunkUploadRequest {
                file_id: task.id(),
                chunk_index: span.index,
                total_chunks,
                file_name: file.name().to_string(),
                file_size: file.size(),
                chunk: bytes,
                metadata: task.metadata(),
            };

            let events_tx = self.events_tx.clone();
            let progress_task = Arc::clone(task);
            let index = span.index;
            let on_progress = move |sent: u64| {
                // Ignored once the task left `Uploading`; a stale in-flight
                // request cannot move the numbers.
                if let Some((uploaded, percent)) =
                    progress_task.record_chunk_progress(index, sent)
                {
                    let _ = events_tx.try_send(UploadEvent::Progress {
                        task_id: progress_task.id(),
                        uploaded_bytes: uploaded,
                        total_bytes: progress_task.total_bytes(),
                        percent,
                    });
                }
            };

            let sent = self.transport.send_chunk(request, &on_progress).await;
            // A completion racing with pause/cancel is discarded.
            if token.is_cancelled() {
                return Err(TransferError::Cancelled);
            }
            sent?;

            task.advance_cursor(span.index + 1);
            debug!(task = %task.id(), chunk = span.index, total = total_chunks, "chunk acknowledged");
        }

        if token.is_cancelled() {
            return Err(TransferError::Cancelled);
        }

        let request = FinalizeRequest {
            file_id: task.id(),
            file_name: file.name().to_string(),
            file_size: file.size(),
            total_chunks,
            metadata: task.metadata(),
        };
        let result = self.transport.finalize(request).await;
        if token.is_cancelled() {
            return Err(TransferError::Cancelled);
        }
        result
    }
}

/// Reads a span off the async executor; file I/O is blocking.
async fn read_span_blocking(
    file: &Arc<SourceFile>,
    span: ChunkSpan,
) -> Result<Vec<u8>, TransferError> {
    let file = Arc::clone(file);
    let bytes = tokio::task::spawn_blocking(move || file.read_span(&span))
        .await
        .map_err(|e| TransferError::Transport(format!("read task join error: {e}")))??;
    Ok(bytes)
}
