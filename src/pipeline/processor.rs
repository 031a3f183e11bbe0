//! One track, end to end: recognize → extract → write tags.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use super::outcome::{ProcessingOutcome, SkipReason};
use crate::config::RetryPolicy;
use crate::metadata::{ImageRole, TagError, TagFields, TagWriter, extract};
use crate::recognition::{RecognitionClient, RecognitionError, RecognitionResult};

/// Drives a single track through the pipeline.
///
/// Cheap to share: workers hold it behind an `Arc` and call
/// [`process`](Self::process) concurrently on different paths.
pub struct TrackProcessor<R, W> {
    recognizer: Arc<R>,
    writer: Arc<W>,
    retry: RetryPolicy,
}

impl<R, W> TrackProcessor<R, W>
where
    R: RecognitionClient,
    W: TagWriter + 'static,
{
    pub fn new(recognizer: Arc<R>, writer: Arc<W>, retry: RetryPolicy) -> Self {
        Self {
            recognizer,
            writer,
            retry,
        }
    }

    /// Process one track. Never panics and never returns an error: every
    /// failure becomes an outcome.
    pub async fn process(&self, path: &Path) -> ProcessingOutcome {
        match AssertUnwindSafe(self.run(path)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let error = panic_message(panic.as_ref());
                tracing::error!(path = %path.display(), %error, "Track processing panicked");
                ProcessingOutcome::Failed { error }
            }
        }
    }

    async fn run(&self, path: &Path) -> ProcessingOutcome {
        let recognition = match self.recognize_with_retry(path).await {
            Ok(recognition) => recognition,
            Err(reason) => {
                tracing::info!(path = %path.display(), %reason, "Skipping track");
                return ProcessingOutcome::Skipped { reason };
            }
        };

        let fields = extract::extract(&recognition);
        if fields.is_empty() {
            tracing::warn!(path = %path.display(), "Match carried no usable fields");
        }

        match self.write_tags(path, &fields).await {
            Ok(cover_art) => ProcessingOutcome::Tagged { cover_art },
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write tags");
                ProcessingOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Recognize `path`, retrying transient failures per the policy.
    ///
    /// Each attempt is bounded by `attempt_timeout`. Timeouts, resets and
    /// connect failures sleep `backoff` before the next attempt; any other
    /// error ends the loop at once.
    pub async fn recognize_with_retry(&self, path: &Path) -> Result<Value, SkipReason> {
        let policy = self.retry;

        for attempt in 1..=policy.max_attempts {
            let result = tokio::time::timeout(policy.attempt_timeout, self.recognizer.recognize(path))
                .await
                .unwrap_or(Err(RecognitionError::Timeout));

            match result {
                Ok(RecognitionResult::Matched(recognition)) => {
                    tracing::debug!(path = %path.display(), attempt, "Track recognized");
                    return Ok(recognition);
                }
                Ok(RecognitionResult::NoMatch) => return Err(SkipReason::NoMatch),
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        path = %path.display(),
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        "Recognition attempt failed"
                    );
                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.backoff).await;
                    }
                }
                Err(e) => return Err(SkipReason::NonTransient(e.to_string())),
            }
        }

        Err(SkipReason::RetriesExhausted {
            attempts: policy.max_attempts,
        })
    }

    /// Write `fields` into the track. Returns whether cover art was attached.
    ///
    /// Container loading, transcoding and saving block on file and process
    /// I/O, so they run on the blocking pool rather than the worker's thread.
    async fn write_tags(&self, path: &Path, fields: &TagFields) -> Result<bool, TagError> {
        let owned_path = path.to_path_buf();
        let scalars = fields.clone();
        let mut container = self
            .blocking(move |writer| {
                let mut container = writer.ensure_container(&owned_path)?;
                writer.set_scalar_fields(&mut container, &scalars);
                writer.persist(&container)?;
                Ok(container)
            })
            .await?;

        let Some(url) = fields.cover_art_url.as_deref() else {
            return Ok(false);
        };

        let art = match self.writer.fetch_cover_art(url).await {
            Ok(Some(art)) => art,
            Ok(None) => {
                tracing::warn!(path = %path.display(), url, "Cover art not available");
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), url, error = %e, "Cover art download failed");
                return Ok(false);
            }
        };

        for role in ImageRole::ALL {
            self.writer.attach_image(&mut container, role, &art);
        }
        self.blocking(move |writer| writer.persist(&container)).await?;

        Ok(true)
    }

    /// Run `op` against the writer on tokio's blocking pool.
    ///
    /// A panic inside `op` is resumed here so the per-track boundary in
    /// [`process`](Self::process) reports it like any other defect.
    async fn blocking<T, F>(&self, op: F) -> Result<T, TagError>
    where
        T: Send + 'static,
        F: FnOnce(&W) -> Result<T, TagError> + Send + 'static,
    {
        let writer = Arc::clone(&self.writer);
        match tokio::task::spawn_blocking(move || op(writer.as_ref())).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(TagError::Interrupted(e.to_string())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panic: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panic: {msg}")
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverArt;
    use crate::metadata::traits::mocks::{CoverResponse, MockTagWriter};
    use crate::recognition::traits::mocks::MockRecognizer;
    use crate::test_utils::{SAMPLE_COVER_URL, matched, matched_track};
    use serde_json::json;
    use std::time::Duration;

    const TRACK: &str = "/music/track.mp3";

    fn jpeg() -> CoverArt {
        CoverArt {
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
            mime_type: "image/jpeg".to_string(),
            url: String::new(),
        }
    }

    fn processor(
        recognizer: MockRecognizer,
        writer: MockTagWriter,
    ) -> (
        TrackProcessor<MockRecognizer, MockTagWriter>,
        Arc<MockRecognizer>,
        Arc<MockTagWriter>,
    ) {
        let recognizer = Arc::new(recognizer);
        let writer = Arc::new(writer);
        let processor = TrackProcessor::new(
            Arc::clone(&recognizer),
            Arc::clone(&writer),
            RetryPolicy::default(),
        );
        (processor, recognizer, writer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tags_and_attaches_cover_art() {
        let (processor, _, writer) =
            processor(MockRecognizer::always(matched()), MockTagWriter::with_cover(jpeg()));
        let path = Path::new(TRACK);

        let outcome = processor.process(path).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: true });

        let stored = writer.stored(path).unwrap();
        assert_eq!(stored.title.as_deref(), Some("Midnight City"));
        assert_eq!(stored.artist.as_deref(), Some("M83"));
        assert_eq!(stored.album.as_deref(), Some("Hurry Up, We're Dreaming"));
        assert_eq!(stored.genre.as_deref(), Some("Alternative"));
        assert_eq!(stored.images.len(), 4);
        for role in ImageRole::ALL {
            assert_eq!(stored.images[&role].url, SAMPLE_COVER_URL);
        }

        // scalar pass + image pass
        assert_eq!(writer.save_count(path), 2);
        assert_eq!(writer.fetched_urls(), vec![SAMPLE_COVER_URL.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures_with_backoff() {
        let k = 3;
        let (processor, recognizer, _) = processor(
            MockRecognizer::failing_then(
                k,
                RecognitionError::ConnectionReset("peer reset".into()),
                matched(),
            ),
            MockTagWriter::without_cover(),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: false });
        assert_eq!(recognizer.call_count(), k + 1);

        let backoff = RetryPolicy::default().backoff;
        let times = recognizer.call_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= backoff, "backoff not observed");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_skip() {
        let (processor, recognizer, writer) = processor(
            MockRecognizer::always_failing(RecognitionError::Connect("refused".into())),
            MockTagWriter::without_cover(),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        assert_eq!(
            outcome,
            ProcessingOutcome::Skipped {
                reason: SkipReason::RetriesExhausted { attempts: 5 }
            }
        );
        assert_eq!(recognizer.call_count(), 5);
        assert_eq!(writer.save_count(Path::new(TRACK)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_service_times_out_each_attempt() {
        let (processor, recognizer, _) = processor(
            MockRecognizer::always(matched()).with_delay(Duration::from_secs(600)),
            MockTagWriter::without_cover(),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        assert_eq!(
            outcome,
            ProcessingOutcome::Skipped {
                reason: SkipReason::RetriesExhausted { attempts: 5 }
            }
        );
        assert_eq!(recognizer.call_count(), 5);

        // timeout + backoff between consecutive attempts
        let policy = RetryPolicy::default();
        let times = recognizer.call_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= policy.attempt_timeout + policy.backoff);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_is_not_retried() {
        let (processor, recognizer, _) = processor(
            MockRecognizer::always_failing(RecognitionError::Http {
                status: 400,
                message: "Bad Request".into(),
            }),
            MockTagWriter::without_cover(),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        assert!(matches!(
            outcome,
            ProcessingOutcome::Skipped {
                reason: SkipReason::NonTransient(_)
            }
        ));
        assert_eq!(recognizer.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_skips_without_touching_file() {
        let (processor, recognizer, writer) = processor(
            MockRecognizer::always(RecognitionResult::NoMatch),
            MockTagWriter::without_cover(),
        );
        let path = Path::new(TRACK);

        let outcome = processor.process(path).await;
        assert_eq!(
            outcome,
            ProcessingOutcome::Skipped {
                reason: SkipReason::NoMatch
            }
        );
        assert_eq!(recognizer.call_count(), 1);
        assert_eq!(writer.save_count(path), 0);
        assert!(writer.stored(path).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cover_art_not_found_keeps_scalar_tags() {
        let (processor, _, writer) =
            processor(MockRecognizer::always(matched()), MockTagWriter::without_cover());
        let path = Path::new(TRACK);

        let outcome = processor.process(path).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: false });

        let stored = writer.stored(path).unwrap();
        assert_eq!(stored.title.as_deref(), Some("Midnight City"));
        assert!(stored.images.is_empty());
        assert_eq!(writer.save_count(path), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cover_art_network_error_is_not_fatal() {
        let (processor, _, writer) = processor(
            MockRecognizer::always(matched()),
            MockTagWriter::new(CoverResponse::Error("connection closed".into())),
        );
        let path = Path::new(TRACK);

        let outcome = processor.process(path).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: false });
        assert!(writer.stored(path).unwrap().images.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_cover_url_skips_fetch() {
        let (processor, _, writer) = processor(
            MockRecognizer::always(matched_track(json!({"title": "Only Title"}))),
            MockTagWriter::with_cover(jpeg()),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: false });
        assert!(writer.fetched_urls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_untaggable_file_is_transcoded_then_tagged() {
        let (processor, _, writer) = processor(
            MockRecognizer::always(matched()),
            MockTagWriter::without_cover().with_untaggable(TRACK),
        );
        let path = Path::new(TRACK);

        let outcome = processor.process(path).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: false });
        assert_eq!(writer.transcoded(), vec![path.to_path_buf()]);
        assert_eq!(
            writer.stored(path).unwrap().title.as_deref(),
            Some("Midnight City")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_transcode_is_failed_outcome() {
        let (processor, _, writer) = processor(
            MockRecognizer::always(matched()),
            MockTagWriter::without_cover()
                .with_untaggable(TRACK)
                .with_failing_transcode(),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        assert!(matches!(outcome, ProcessingOutcome::Failed { .. }));
        assert_eq!(writer.save_count(Path::new(TRACK)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_is_idempotent() {
        let (processor, _, writer) =
            processor(MockRecognizer::always(matched()), MockTagWriter::with_cover(jpeg()));
        let path = Path::new(TRACK);

        processor.process(path).await;
        let first = writer.stored(path).unwrap();

        let outcome = processor.process(path).await;
        assert_eq!(outcome, ProcessingOutcome::Tagged { cover_art: true });
        let second = writer.stored(path).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.images.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_becomes_failed() {
        let (processor, _, _) = processor(
            MockRecognizer::always(matched()).panicking_on(TRACK),
            MockTagWriter::without_cover(),
        );

        let outcome = processor.process(Path::new(TRACK)).await;
        match outcome {
            ProcessingOutcome::Failed { error } => assert!(error.contains("panic")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
