//! # Thumbnails
//!
//! Low-density captures of a document's first page, taken in the background
//! while the document may still be laying out. A failed attempt is retried
//! after a delay, a bounded number of times; running out of attempts or the
//! node being unmounted ends quietly with no thumbnail.
//!
//! ## Retry State
//!
//! ```text
//!            next_attempt
//!   Idle ───────────────► Attempting ──success──► Succeeded
//!     ▲                        │
//!     │ delay elapsed          │ failure
//!     │                        ▼
//!   Waiting ◄──attempts left── ? ──none left──► Exhausted
//!     │
//!     └──unmounted──► Cancelled
//! ```

use std::time::Duration;

use crate::config::{CanvasSize, ThumbnailTable};
use crate::render::{Capture, CaptureOptions, capture};
use crate::stage::NodeHandle;

/// Terminal state of a [`BoundedRetry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Succeeded,
    Exhausted,
    Cancelled,
}

/// Attempt counter allowing at most `max_retries + 1` attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedRetry {
    max_retries: u32,
    delay: Duration,
    attempts: u32,
    outcome: Option<RetryOutcome>,
}

impl BoundedRetry {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            attempts: 0,
            outcome: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn outcome(&self) -> Option<RetryOutcome> {
        self.outcome
    }

    /// Start the next attempt, returning its 1-based number, or `None` once
    /// the retry has finished.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.outcome.is_some() || self.attempts > self.max_retries {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    pub fn succeed(&mut self) {
        self.outcome.get_or_insert(RetryOutcome::Succeeded);
    }

    /// Record a failed attempt. Returns `true` if another attempt is allowed.
    pub fn fail(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        if self.attempts > self.max_retries {
            self.outcome = Some(RetryOutcome::Exhausted);
            return false;
        }
        true
    }

    pub fn cancel(&mut self) {
        self.outcome.get_or_insert(RetryOutcome::Cancelled);
    }
}

/// A thumbnail to take.
#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    pub source: NodeHandle,
    pub density: f32,
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Capture region in native pixels; the whole first page when `None`.
    pub target_size: Option<CanvasSize>,
}

/// Takes thumbnails with per-kind retry tuning.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailService {
    table: ThumbnailTable,
}

impl ThumbnailService {
    pub fn new(table: ThumbnailTable) -> Self {
        Self { table }
    }

    /// Request with the settings for `source`'s document kind.
    pub fn request(&self, source: NodeHandle) -> ThumbnailRequest {
        let settings = self.table.for_kind(source.kind());
        ThumbnailRequest {
            source,
            density: settings.density,
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay(),
            target_size: None,
        }
    }

    /// Take the thumbnail, or `None` after exhaustion or unmount.
    pub async fn generate(&self, request: &ThumbnailRequest) -> Option<Capture> {
        self.attempt(request).await.0
    }

    /// Like [`generate`](Self::generate), also returning the finished retry
    /// state.
    pub async fn attempt(&self, request: &ThumbnailRequest) -> (Option<Capture>, BoundedRetry) {
        let source = &request.source;
        let mut opts = CaptureOptions::png(request.density);
        opts.size_override = request.target_size;

        let mut retry = BoundedRetry::new(request.max_retries, request.retry_delay);
        let mut mounted = source.mount_watch();
        while let Some(attempt) = retry.next_attempt() {
            if !source.is_mounted() {
                retry.cancel();
                break;
            }
            if let Some(shot) = capture(source, 0, &opts).await {
                retry.succeed();
                log::debug!("thumbnail of node {} taken on attempt {}", source.id(), attempt);
                return (Some(shot), retry);
            }
            if !retry.fail() {
                break;
            }
            log::debug!(
                "thumbnail attempt {} for node {} failed, retrying in {:?}",
                attempt,
                source.id(),
                retry.delay()
            );
            tokio::select! {
                _ = tokio::time::sleep(retry.delay()) => {}
                _ = mounted.wait_for(|m| !*m) => {
                    retry.cancel();
                    break;
                }
            }
        }
        if retry.outcome().is_none() {
            retry.cancel();
        }
        log::debug!(
            "no thumbnail for node {}: {:?} after {} attempt(s)",
            source.id(),
            retry.outcome(),
            retry.attempts()
        );
        (None, retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::resolve::ImageMap;
    use crate::document::{DocumentKind, Payload, render};
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    fn pending() -> NodeHandle {
        NodeHandle::pending(render(DocumentKind::Report, "modern", &Payload::new()))
    }

    fn request(source: NodeHandle, max_retries: u32, delay_ms: u64) -> ThumbnailRequest {
        ThumbnailRequest {
            source,
            density: 0.05,
            max_retries,
            retry_delay: Duration::from_millis(delay_ms),
            target_size: None,
        }
    }

    #[test]
    fn test_bounded_retry_counts() {
        let mut retry = BoundedRetry::new(2, Duration::from_millis(10));
        let mut attempts = Vec::new();
        while let Some(n) = retry.next_attempt() {
            attempts.push(n);
            if !retry.fail() {
                break;
            }
        }
        assert_eq!(attempts, vec![1, 2, 3]);
        assert_eq!(retry.outcome(), Some(RetryOutcome::Exhausted));
        assert_eq!(retry.next_attempt(), None);
    }

    #[test]
    fn test_terminal_states_stick() {
        let mut retry = BoundedRetry::new(5, Duration::ZERO);
        retry.next_attempt();
        retry.succeed();
        retry.cancel();
        assert_eq!(retry.outcome(), Some(RetryOutcome::Succeeded));
        assert!(!retry.fail());
    }

    #[tokio::test]
    async fn test_ready_node_first_attempt() {
        let source = NodeHandle::ready(render(DocumentKind::Graphic, "quote", &Payload::new()), ImageMap::new());
        let (shot, retry) = ThumbnailService::default().attempt(&request(source, 3, 100)).await;
        let shot = shot.unwrap();
        assert_eq!((shot.width, shot.height), (54, 54));
        assert_eq!(retry.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_silent_and_bounded() {
        let start = Instant::now();
        let (shot, retry) = ThumbnailService::default().attempt(&request(pending(), 3, 100)).await;
        assert!(shot.is_none());
        assert_eq!(retry.attempts(), 4);
        assert_eq!(retry.outcome(), Some(RetryOutcome::Exhausted));
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_once_layout_finishes() {
        let source = pending();
        let late = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            late.finish_layout(ImageMap::new());
        });
        let (shot, retry) = ThumbnailService::default().attempt(&request(source, 5, 100)).await;
        assert!(shot.is_some());
        assert_eq!(retry.attempts(), 4);
        assert_eq!(retry.outcome(), Some(RetryOutcome::Succeeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_wakes_the_wait() {
        let source = pending();
        let other = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            other.unmount();
        });
        let start = Instant::now();
        let (shot, retry) = ThumbnailService::default().attempt(&request(source, 10, 1000)).await;
        assert!(shot.is_none());
        assert_eq!(retry.outcome(), Some(RetryOutcome::Cancelled));
        assert_eq!(retry.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::from_millis(150));
    }

    #[test]
    fn test_request_uses_kind_settings() {
        let table = ThumbnailTable::default();
        let service = ThumbnailService::new(table.clone());
        let req = service.request(pending());
        assert_eq!(req.max_retries, table.report.max_retries);
        assert_eq!(req.retry_delay, table.report.retry_delay());
    }
}
