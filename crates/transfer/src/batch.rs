//! Batch coordinator: the ordered set of upload tasks and their scheduling.

use std::sync::{Arc, RwLock};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use docferry_protocol::DocumentMetadata;

use crate::engine::TransferEngine;
use crate::source::SourceFile;
use crate::stats::BatchStats;
use crate::task::{TaskState, UploadTask};
use crate::types::{BatchLimits, Rejection, SchedulePolicy};
use crate::validation::screen_files;

/// Holds the ordered collection of tasks, screens incoming files, runs the
/// batch through a [`TransferEngine`], and aggregates statistics.
///
/// The collection is mutated only through this type; a removed task is first
/// cancelled so an in-flight transfer stops consuming chunks.
pub struct UploadBatch {
    limits: BatchLimits,
    policy: SchedulePolicy,
    tasks: RwLock<Vec<Arc<UploadTask>>>,
}

impl UploadBatch {
    /// Creates a batch with sequential scheduling.
    pub fn new(limits: BatchLimits) -> Self {
        Self::with_policy(limits, SchedulePolicy::Sequential)
    }

    pub fn with_policy(limits: BatchLimits, policy: SchedulePolicy) -> Self {
        Self {
            limits,
            policy,
            tasks: RwLock::new(Vec::new()),
        }
    }

    /// Screens `files` and wraps the accepted ones into idle tasks, in
    /// input order. Rejections are returned synchronously and never become
    /// tasks.
    pub fn add_files(
        &self,
        files: Vec<SourceFile>,
        metadata: Option<DocumentMetadata>,
    ) -> (Vec<Arc<UploadTask>>, Vec<Rejection>) {
        let existing: Vec<(String, u64)> = {
            let tasks = self.tasks.read().unwrap();
            tasks
                .iter()
                .map(|t| {
                    let file = t.file();
                    (file.name().to_string(), file.size())
                })
                .collect()
        };

        let (accepted, rejected) = screen_files(files, &existing, &self.limits);
        for rejection in &rejected {
            debug!(
                file = %rejection.file_name,
                reason = %rejection.reason,
                "file rejected"
            );
        }

        let new_tasks: Vec<Arc<UploadTask>> = accepted
            .into_iter()
            .map(|file| UploadTask::new(file, self.limits.chunk_size, metadata.clone()))
            .collect();

        let mut tasks = self.tasks.write().unwrap();
        tasks.extend(new_tasks.iter().cloned());
        info!(added = new_tasks.len(), total = tasks.len(), "files added to batch");
        (new_tasks, rejected)
    }

    /// Returns all tasks in batch order.
    pub fn tasks(&self) -> Vec<Arc<UploadTask>> {
        self.tasks.read().unwrap().clone()
    }

    /// Looks up a task by id.
    pub fn get(&self, id: &str) -> Option<Arc<UploadTask>> {
        let tasks = self.tasks.read().unwrap();
        tasks.iter().find(|t| t.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().unwrap().is_empty()
    }

    /// Cancels the task if it is still running, then removes it.
    pub fn remove(&self, id: &str) -> bool {
        let task = {
            let mut tasks = self.tasks.write().unwrap();
            let Some(position) = tasks.iter().position(|t| t.id() == id) else {
                return false;
            };
            tasks.remove(position)
        };
        task.cancel();
        debug!(task = %id, "task removed from batch");
        true
    }

    /// Cancels every unfinished task and empties the batch.
    pub fn clear(&self) {
        let drained: Vec<Arc<UploadTask>> = {
            let mut tasks = self.tasks.write().unwrap();
            std::mem::take(&mut *tasks)
        };
        for task in &drained {
            task.cancel();
        }
        info!(cleared = drained.len(), "batch cleared");
    }

    /// Runs every currently-idle task through the engine.
    ///
    /// Sequential by default: a task's first chunk is never sent before the
    /// previous task reached a terminal or paused state. A failed or
    /// cancelled task never prevents the remaining tasks from running.
    pub async fn run_all(&self, engine: &Arc<TransferEngine>) {
        let pending: Vec<Arc<UploadTask>> = {
            let tasks = self.tasks.read().unwrap();
            tasks
                .iter()
                .filter(|t| t.state() == TaskState::Idle)
                .cloned()
                .collect()
        };
        if pending.is_empty() {
            debug!("run_all: no idle tasks");
            return;
        }
        info!(tasks = pending.len(), policy = ?self.policy, "running batch");

        match self.policy {
            SchedulePolicy::Sequential => {
                for task in pending {
                    if task.state() != TaskState::Idle {
                        continue;
                    }
                    if let Err(e) = engine.run(&task).await {
                        warn!(task = %task.id(), error = %e, "task failed");
                    }
                }
            }
            SchedulePolicy::Concurrent(limit) => {
                let semaphore = Arc::new(Semaphore::new(limit.max(1)));
                let mut set = JoinSet::new();
                for task in pending {
                    let engine = Arc::clone(engine);
                    let semaphore = Arc::clone(&semaphore);
                    set.spawn(async move {
                        let Ok(_permit) = semaphore.acquire().await else {
                            return;
                        };
                        if task.state() != TaskState::Idle {
                            return;
                        }
                        if let Err(e) = engine.run(&task).await {
                            warn!(task = %task.id(), error = %e, "task failed");
                        }
                    });
                }
                while set.join_next().await.is_some() {}
            }
        }
    }

    /// Folds the current task set into aggregate statistics.
    pub fn stats(&self) -> BatchStats {
        let tasks = self.tasks.read().unwrap();
        BatchStats::collect(tasks.iter().map(|t| t.snapshot()))
    }
}
