//! Fixed-size pool of tokio workers draining a [`WorkQueue`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinSet;

use super::outcome::{ProcessingOutcome, RunSummary};
use super::processor::TrackProcessor;
use super::queue::WorkQueue;
use crate::metadata::TagWriter;
use crate::recognition::RecognitionClient;

/// Progress after one track finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Called once per finished track, from whichever worker finished it.
pub type ProgressFn = Arc<dyn Fn(&Path, &ProcessingOutcome, Progress) + Send + Sync>;

pub struct WorkerPool<R, W> {
    processor: Arc<TrackProcessor<R, W>>,
    workers: usize,
    on_progress: Option<ProgressFn>,
}

impl<R, W> WorkerPool<R, W>
where
    R: RecognitionClient + 'static,
    W: TagWriter + 'static,
{
    pub fn new(processor: TrackProcessor<R, W>, workers: usize) -> Self {
        Self {
            processor: Arc::new(processor),
            workers: workers.max(1),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Drain `queue` with `workers` concurrent tasks and wait for all of them.
    ///
    /// Each worker claims one track at a time and only claims the next one
    /// after the current track reached its outcome. A worker that dies is
    /// logged and recorded; the others keep draining.
    pub async fn run(&self, queue: Arc<WorkQueue>) -> RunSummary {
        let summary = Arc::new(Mutex::new(RunSummary::default()));
        let mut tasks = JoinSet::new();

        tracing::info!(
            workers = self.workers,
            tracks = queue.total(),
            "Starting worker pool"
        );

        for worker in 0..self.workers {
            let processor = Arc::clone(&self.processor);
            let queue = Arc::clone(&queue);
            let summary = Arc::clone(&summary);
            let on_progress = self.on_progress.clone();

            tasks.spawn(async move {
                while let Some(path) = queue.try_claim() {
                    tracing::debug!(worker, path = %path.display(), "Claimed track");

                    let outcome = processor.process(&path).await;
                    let completed = queue.mark_done();
                    summary.lock().record(&path, &outcome);

                    if let Some(callback) = &on_progress {
                        let progress = Progress {
                            completed,
                            total: queue.total(),
                        };
                        callback(&path, &outcome, progress);
                    }
                }
                tracing::debug!(worker, "Queue drained, worker exiting");
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker task failed");
                summary.lock().worker_failures.push(e.to_string());
            }
        }

        if !queue.is_empty() {
            tracing::error!(
                remaining = queue.len(),
                "Every worker stopped before the queue was drained"
            );
        }

        let summary = std::mem::take(&mut *summary.lock());
        tracing::info!(
            processed = summary.processed(),
            completed = queue.completed(),
            tagged = summary.tagged,
            skipped = summary.skipped,
            failed = summary.failed(),
            "Worker pool finished"
        );
        summary
    }
}
