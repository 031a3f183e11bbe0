//! The tagging pipeline.
//!
//! ```text
//! scanner ──► WorkQueue ──► WorkerPool (N tasks) ──► TrackProcessor
//!                                                     ├─ RecognitionClient (retry/backoff/timeout)
//!                                                     ├─ metadata::extract
//!                                                     └─ TagWriter
//! ```
//!
//! The queue is filled and closed before any worker starts. Workers share
//! nothing but the queue; each claimed path belongs to exactly one worker.

mod outcome;
mod pool;
mod processor;
mod queue;

pub use outcome::{ProcessingOutcome, RunSummary, SkipReason};
pub use pool::{Progress, ProgressFn, WorkerPool};
pub use processor::TrackProcessor;
pub use queue::{QueueWriter, WorkQueue};
