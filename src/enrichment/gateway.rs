use std::time::Duration;

use tracing::{debug, warn};

use super::client::ContentSource;
use super::error::EnrichError;

/// Error-containing front for a [`ContentSource`].
///
/// `enrich` never fails: every error, a timeout included, degrades to
/// `None` so the receipt is printed without an enrichment block.
pub struct Enricher<S> {
    source: Option<S>,
    timeout: Duration,
}

impl<S: ContentSource> Enricher<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self {
            source: Some(source),
            timeout,
        }
    }

    /// An enricher that never calls out and always yields `None`.
    pub fn disabled() -> Self {
        Self {
            source: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Fetch enrichment text for `raw`, or `None` on any failure.
    ///
    /// A single attempt is made and it is bounded by the configured timeout
    /// even if the source itself never gives up.
    pub async fn enrich(&self, raw: &str) -> Option<String> {
        let source = self.source.as_ref()?;

        let result = match tokio::time::timeout(self.timeout, source.fetch(raw)).await {
            Ok(result) => result,
            Err(_) => Err(EnrichError::timeout(self.timeout)),
        };

        match result {
            Ok(text) if !text.trim().is_empty() => {
                debug!(bytes = text.len(), "enrichment received");
                Some(text)
            }
            Ok(_) => {
                warn!(error = %EnrichError::EmptyContent, "enrichment skipped");
                None
            }
            Err(e) => {
                warn!(error = %e, "enrichment skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        response: Result<&'static str, u16>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn ok(text: &'static str) -> Self {
            Self {
                response: Ok(text),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                response: Err(status),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ContentSource for FixedSource {
        async fn fetch(&self, _raw: &str) -> Result<String, EnrichError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.response {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(EnrichError::ApiError {
                    status,
                    message: "mock error".into(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn success_passes_text_through() {
        let enricher = Enricher::new(FixedSource::ok("Thanks!\nCome again"), Duration::from_secs(1));
        assert_eq!(
            enricher.enrich("Hello").await.as_deref(),
            Some("Thanks!\nCome again")
        );
    }

    #[tokio::test]
    async fn failure_becomes_none() {
        let enricher = Enricher::new(FixedSource::failing(500), Duration::from_secs(1));
        assert_eq!(enricher.enrich("Hello").await, None);
    }

    #[tokio::test]
    async fn blank_text_becomes_none() {
        let enricher = Enricher::new(FixedSource::ok(" \n "), Duration::from_secs(1));
        assert_eq!(enricher.enrich("Hello").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_is_cut_off() {
        let mut source = FixedSource::ok("too late");
        source.delay = Duration::from_secs(60);
        let enricher = Enricher::new(source, Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        assert_eq!(enricher.enrich("Hello").await, None);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn single_attempt_per_call() {
        let enricher = Enricher::new(FixedSource::failing(502), Duration::from_secs(1));
        enricher.enrich("Hello").await;
        let calls = enricher.source.as_ref().unwrap().calls.load(Ordering::SeqCst);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn disabled_never_calls_out() {
        let enricher: Enricher<FixedSource> = Enricher::disabled();
        assert!(!enricher.is_enabled());
        assert_eq!(enricher.enrich("Hello").await, None);
    }
}
