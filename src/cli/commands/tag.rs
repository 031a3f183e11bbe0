//! Batch tagging of whole directories.

use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::{self, ResultExt};
use crate::metadata::LoftyTagWriter;
use crate::pipeline::{
    ProcessingOutcome, Progress, RunSummary, TrackProcessor, WorkQueue, WorkerPool,
};
use crate::recognition::HttpRecognitionClient;
use crate::{scanner, transcode};

use super::TagArgs;

/// Recognize and tag every matching track directly inside the given directories
pub fn cmd_tag(rt: &Runtime, args: &TagArgs) -> anyhow::Result<()> {
    let config = args.config();
    let processor = build_processor(&config)?;

    let discovery = scanner::discover_all(&args.dirs, &config.extensions);
    for error in &discovery.errors {
        eprintln!("✗ {}", error);
    }
    if discovery.errors.len() == args.dirs.len() {
        bail!("None of the given directories could be read");
    }
    if discovery.files.is_empty() {
        println!("No matching tracks found.");
        return Ok(());
    }

    if !transcode::is_ffmpeg_available() {
        tracing::warn!("ffmpeg not found; tracks that need transcoding will fail");
    }

    let queue = Arc::new(WorkQueue::from_paths(discovery.files));
    println!(
        "Tagging {} tracks with {} workers...",
        queue.total(),
        config.workers
    );
    println!();

    let pool = WorkerPool::new(processor, config.workers).with_progress(Arc::new(print_progress));
    let summary = rt.block_on(pool.run(queue));

    print_summary(&summary);
    Ok(())
}

/// Validate `config` and wire the production recognizer and tag writer.
fn build_processor(
    config: &Config,
) -> error::Result<TrackProcessor<HttpRecognitionClient, LoftyTagWriter>> {
    config.validate()?;

    let recognizer = HttpRecognitionClient::new(&config.recognition)
        .map_err(error::Error::from)
        .with_context("Failed to set up recognition client")?;

    Ok(TrackProcessor::new(
        Arc::new(recognizer),
        Arc::new(LoftyTagWriter::new()),
        config.retry,
    ))
}

fn print_progress(path: &Path, outcome: &ProcessingOutcome, progress: Progress) {
    println!(
        "[{}/{}] {} ... {}",
        progress.completed,
        progress.total,
        path.display(),
        outcome
    );
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "Done! {} tagged, {} skipped, {} failed",
        summary.tagged,
        summary.skipped,
        summary.failed()
    );
    if summary.with_cover_art > 0 {
        println!("  Cover art attached to {} tracks", summary.with_cover_art);
    }

    if !summary.failures.is_empty() {
        println!();
        println!("Failures:");
        for (path, error) in &summary.failures {
            println!("  {}: {}", path.display(), error);
        }
    }

    for failure in &summary.worker_failures {
        eprintln!("✗ worker stopped: {}", failure);
    }
}
