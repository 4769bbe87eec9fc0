//! Scan session orchestration.
//!
//! A session owns the page host handle, the extractor, the hook buffer,
//! and a settings source. One `run_scan` pass requests a snapshot with
//! bounded retries, drains the hook buffer, extracts, and normalizes under
//! the current policy. Transient snapshot failures are retried; a host
//! that reports its page context gone ends the scan immediately.

use crate::error::{Result, ScanError};
use crate::extractor::{PageExtractor, PageSnapshot};
use crate::fetch::SourceFetcher;
use crate::normalizer::{normalize, ScanPolicy};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use thiserror::Error;
use webscope_core::ScanRecord;
use webscope_db::settings;
use webscope_hook::HookBuffer;

/// Default number of snapshot attempts before giving up.
pub const DEFAULT_MAX_SNAPSHOT_ATTEMPTS: u32 = 3;

/// Default pause between snapshot attempts.
pub const DEFAULT_SNAPSHOT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Why a snapshot request failed.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host did not answer; worth retrying.
    #[error("host unreachable: {0}")]
    Unreachable(String),

    /// The page context is gone for good (navigation, tab closed).
    #[error("page context gone: {0}")]
    Gone(String),
}

/// Source of rendered page snapshots.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Request the current rendered snapshot of the page.
    async fn request_snapshot(&self) -> std::result::Result<PageSnapshot, HostError>;
}

/// Source of the scan policy values re-read on every pass.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Current comment-filter pattern list.
    async fn comment_filters(&self) -> Result<Vec<String>>;

    /// Current maximum link count.
    async fn max_links(&self) -> Result<usize>;
}

/// [`SettingsProvider`] backed by the store's settings table.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pool: SqlitePool,
}

impl StoreSettings {
    /// Wrap a store connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsProvider for StoreSettings {
    async fn comment_filters(&self) -> Result<Vec<String>> {
        Ok(settings::comment_filters(&self.pool).await?)
    }

    async fn max_links(&self) -> Result<usize> {
        Ok(settings::max_links(&self.pool).await?)
    }
}

/// One scanning session against a single page host.
pub struct ScanSession<H, F, S> {
    host: H,
    extractor: PageExtractor<F>,
    settings: S,
    hooks: HookBuffer,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<H, F, S> ScanSession<H, F, S>
where
    H: PageHost,
    F: SourceFetcher,
    S: SettingsProvider,
{
    /// Build a session with the default retry schedule.
    pub fn new(host: H, extractor: PageExtractor<F>, settings: S, hooks: HookBuffer) -> Self {
        Self {
            host,
            extractor,
            settings,
            hooks,
            max_attempts: DEFAULT_MAX_SNAPSHOT_ATTEMPTS,
            retry_delay: DEFAULT_SNAPSHOT_RETRY_DELAY,
        }
    }

    /// Take the snapshot retry schedule from the scanning configuration.
    #[must_use]
    pub fn with_config(self, config: &webscope_core::ScanningConfig) -> Self {
        self.with_retry(
            config.max_snapshot_attempts,
            Duration::from_millis(config.snapshot_retry_delay_ms),
        )
    }

    /// Override the snapshot retry schedule.
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Run one full scan pass and return the normalized record.
    ///
    /// Drains the hook buffer, so observations recorded during this pass
    /// belong to it and the next pass starts clean.
    pub async fn run_scan(&mut self) -> Result<ScanRecord> {
        let page = self.snapshot_with_retry().await?;
        tracing::info!(url = %page.url, "Captured page snapshot");

        let hooks = self.hooks.snapshot();
        let payload = self.extractor.extract(&page, hooks).await?;

        let patterns = self.settings.comment_filters().await?;
        let max_links = self.settings.max_links().await?;
        let policy = ScanPolicy::new(&patterns, max_links)?;

        Ok(normalize(payload, &policy, Some(&page.url), Utc::now()))
    }

    async fn snapshot_with_retry(&self) -> Result<PageSnapshot> {
        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.host.request_snapshot().await {
                Ok(page) => return Ok(page),
                Err(HostError::Gone(reason)) => {
                    tracing::warn!(reason = %reason, "Page context gone; aborting scan");
                    return Err(ScanError::HostGone(reason));
                }
                Err(HostError::Unreachable(reason)) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        reason = %reason,
                        "Snapshot request failed"
                    );
                    last_error = reason;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(ScanError::SnapshotRetriesExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use webscope_core::CommentKind;
    use webscope_hook::HookRecorder;

    struct FlakyHost {
        failures_before_success: u32,
        attempts: Arc<AtomicU32>,
    }

    #[async_trait]
    impl PageHost for FlakyHost {
        async fn request_snapshot(&self) -> std::result::Result<PageSnapshot, HostError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures_before_success {
                return Err(HostError::Unreachable("no response".to_string()));
            }
            Ok(PageSnapshot {
                url: "https://example.com/".to_string(),
                html: "<html><body><!-- visible --><!--   --><a href=\"/next\">next</a></body></html>"
                    .to_string(),
            })
        }
    }

    struct GoneHost {
        attempts: Arc<AtomicU32>,
    }

    #[async_trait]
    impl PageHost for GoneHost {
        async fn request_snapshot(&self) -> std::result::Result<PageSnapshot, HostError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(HostError::Gone("tab closed".to_string()))
        }
    }

    struct NoSourceFetcher;

    #[async_trait]
    impl SourceFetcher for NoSourceFetcher {
        async fn fetch_source(&self, _url: &str) -> std::result::Result<String, FetchError> {
            Err(FetchError::Http("offline".to_string()))
        }
    }

    struct FixedSettings;

    #[async_trait]
    impl SettingsProvider for FixedSettings {
        async fn comment_filters(&self) -> Result<Vec<String>> {
            Ok(vec![r"^\s*$".to_string(), r"^<!--\s*-->$".to_string()])
        }

        async fn max_links(&self) -> Result<usize> {
            Ok(1000)
        }
    }

    fn session<H: PageHost>(
        host: H,
    ) -> ScanSession<H, NoSourceFetcher, FixedSettings> {
        let (recorder, buffer) = HookRecorder::channel();
        drop(recorder);
        ScanSession::new(
            host,
            PageExtractor::new(NoSourceFetcher),
            FixedSettings,
            buffer,
        )
        .with_retry(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let host = FlakyHost {
            failures_before_success: 2,
            attempts: attempts.clone(),
        };

        let record = session(host).run_scan().await.expect("scan succeeds");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(record.url, "https://example.com/");
        assert_eq!(record.payload.links, vec!["https://example.com/next"]);
        // The blank DOM comment was filtered out
        assert_eq!(record.payload.comments.len(), 1);
        assert_eq!(record.payload.comments[0].kind, CommentKind::Dom);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let attempts = Arc::new(AtomicU32::new(0));
        let host = FlakyHost {
            failures_before_success: 10,
            attempts: attempts.clone(),
        };

        let result = session(host).run_scan().await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(ScanError::SnapshotRetriesExhausted { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_retry_schedule_from_config() {
        let config = webscope_core::ScanningConfig {
            max_snapshot_attempts: 2,
            snapshot_retry_delay_ms: 1,
            ..Default::default()
        };

        let attempts = Arc::new(AtomicU32::new(0));
        let host = FlakyHost {
            failures_before_success: 10,
            attempts: attempts.clone(),
        };
        let (_recorder, buffer) = HookRecorder::channel();
        let mut session = ScanSession::new(
            host,
            PageExtractor::new(NoSourceFetcher),
            FixedSettings,
            buffer,
        )
        .with_config(&config);

        let result = session.run_scan().await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(matches!(
            result,
            Err(ScanError::SnapshotRetriesExhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_gone_host_is_terminal() {
        let attempts = Arc::new(AtomicU32::new(0));
        let host = GoneHost {
            attempts: attempts.clone(),
        };

        let result = session(host).run_scan().await;
        assert!(matches!(result, Err(ScanError::HostGone(_))));
        // No retry after a terminal failure
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hook_buffer_is_drained_per_pass() {
        let (recorder, buffer) = HookRecorder::channel();
        recorder.try_install();
        recorder.record_request(webscope_core::RequestKind::Fetch, "https://api.example.com/v1");

        let host = FlakyHost {
            failures_before_success: 0,
            attempts: Arc::new(AtomicU32::new(0)),
        };
        let mut session = ScanSession::new(
            host,
            PageExtractor::new(NoSourceFetcher),
            FixedSettings,
            buffer,
        )
        .with_retry(1, Duration::from_millis(1));

        let first = session.run_scan().await.expect("first scan");
        assert_eq!(first.payload.hooked_requests.len(), 1);

        let second = session.run_scan().await.expect("second scan");
        assert!(second.payload.hooked_requests.is_empty());
    }
}
