//! Finite, pre-populated work queue shared by the tagging workers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};

/// Write side of the queue, only alive while discovery runs.
///
/// [`QueueWriter::close`] consumes the writer, so nothing can be enqueued
/// once workers may be draining.
pub struct QueueWriter {
    tx: Sender<PathBuf>,
    rx: Receiver<PathBuf>,
    count: usize,
}

impl QueueWriter {
    /// Add one track.
    pub fn enqueue(&mut self, path: PathBuf) {
        // The receiver lives in `self`, so the channel cannot be disconnected
        if self.tx.send(path).is_ok() {
            self.count += 1;
        }
    }

    /// Stop accepting tracks and hand out the drainable queue.
    pub fn close(self) -> WorkQueue {
        let QueueWriter { tx, rx, count } = self;
        drop(tx);
        WorkQueue {
            rx,
            total: count,
            completed: AtomicUsize::new(0),
        }
    }
}

impl Extend<PathBuf> for QueueWriter {
    fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, iter: I) {
        for path in iter {
            self.enqueue(path);
        }
    }
}

/// Drain side of the queue.
///
/// Claiming is atomic: a path handed to one caller is never seen by another.
#[derive(Debug)]
pub struct WorkQueue {
    rx: Receiver<PathBuf>,
    total: usize,
    completed: AtomicUsize,
}

impl WorkQueue {
    /// Start building a queue.
    pub fn builder() -> QueueWriter {
        let (tx, rx) = crossbeam_channel::unbounded();
        QueueWriter { tx, rx, count: 0 }
    }

    /// Build a closed queue from `paths`.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut writer = Self::builder();
        writer.extend(paths);
        writer.close()
    }

    /// Take one track, or `None` once the queue is empty. Never blocks.
    pub fn try_claim(&self) -> Option<PathBuf> {
        self.rx.try_recv().ok()
    }

    /// Record that a claimed track reached its outcome. Returns the number
    /// of completed tracks including this one.
    pub fn mark_done(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Tracks not yet claimed.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Tracks enqueued in total.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Tracks marked done so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}
