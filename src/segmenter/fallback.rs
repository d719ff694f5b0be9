//! Fallback segmentation
//!
//! Clauses without a detectable structural marker can still describe
//! several indications in running prose. Such clauses are handed to an
//! external segmenter behind the `FallbackSegmenter` trait; the engine
//! ships no implementation of its own. All calls go through a gate that
//! bounds concurrency and retries transient failures with exponential
//! backoff.

use crate::config::ResolverConfig;
use crate::error::{ResolverError, Result};
use log::{debug, warn};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Rough size class of the clause, so implementations can route long
/// texts differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthHint {
    Short,
    Long,
}

/// One clause submitted for fallback segmentation
#[derive(Debug, Clone)]
pub struct FallbackRequest {
    pub text: String,
    pub hint: LengthHint,
}

/// One block proposed by the fallback segmenter
#[derive(Debug, Clone)]
pub struct FallbackSegment {
    pub text: String,
    pub suggested_name: Option<String>,
}

/// Segmentation verdict for a single clause
#[derive(Debug, Clone)]
pub struct FallbackResponse {
    pub is_multi_indication: bool,
    pub segments: Vec<FallbackSegment>,
}

/// External segmenter for marker-free clauses
pub trait FallbackSegmenter: Send + Sync {
    /// Segment one clause
    ///
    /// Transient failures should be reported as
    /// [`ResolverError::FallbackTransient`] so the gate retries them.
    fn segment<'a>(
        &'a self,
        request: FallbackRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FallbackResponse>> + Send + 'a>>;
}

/// Concurrency and retry gate in front of a `FallbackSegmenter`
pub struct FallbackGate {
    inner: Arc<dyn FallbackSegmenter>,
    semaphore: Arc<Semaphore>,
    max_retries: u32,
    base_delay: std::time::Duration,
    long_text_threshold: usize,
}

impl FallbackGate {
    /// Wrap a segmenter with the configured limits
    #[must_use]
    pub fn new(inner: Arc<dyn FallbackSegmenter>, config: &ResolverConfig) -> Self {
        Self {
            inner,
            semaphore: Arc::new(Semaphore::new(config.fallback_concurrency)),
            max_retries: config.fallback_max_retries,
            base_delay: config.fallback_retry_base_delay,
            long_text_threshold: config.fallback_long_text_threshold,
        }
    }

    /// Submit one clause, retrying transient failures
    ///
    /// # Errors
    /// Returns the final error once retries are exhausted, or
    /// immediately for non-retryable failures.
    pub async fn segment(&self, text: &str) -> Result<FallbackResponse> {
        let hint = if text.chars().count() >= self.long_text_threshold {
            LengthHint::Long
        } else {
            LengthHint::Short
        };
        let request = FallbackRequest {
            text: text.to_string(),
            hint,
        };

        let mut attempt = 0;
        loop {
            let _permit = self
                .semaphore
                .acquire()
                .await
                .map_err(|e| ResolverError::Fallback(e.to_string()))?;
            match self.inner.segment(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    attempt += 1;
                    warn!(
                        "Fallback attempt {attempt}/{} failed ({e}), retrying in {delay:?}",
                        self.max_retries
                    );
                    drop(_permit);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    debug!("Fallback gave up after {attempt} retries: {e}");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySegmenter {
        calls: AtomicU32,
        fail_first: u32,
    }

    impl FallbackSegmenter for FlakySegmenter {
        fn segment<'a>(
            &'a self,
            request: FallbackRequest,
        ) -> Pin<Box<dyn Future<Output = Result<FallbackResponse>> + Send + 'a>> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst);
                if call < self.fail_first {
                    return Err(ResolverError::FallbackTransient("busy".to_string()));
                }
                Ok(FallbackResponse {
                    is_multi_indication: false,
                    segments: vec![FallbackSegment {
                        text: request.text,
                        suggested_name: None,
                    }],
                })
            })
        }
    }

    fn gate(inner: Arc<dyn FallbackSegmenter>) -> FallbackGate {
        let config = ResolverConfig {
            fallback_retry_base_delay: std::time::Duration::from_millis(1),
            ..ResolverConfig::default()
        };
        FallbackGate::new(inner, &config)
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let inner = Arc::new(FlakySegmenter {
            calls: AtomicU32::new(0),
            fail_first: 2,
        });
        let gate = gate(inner.clone());
        let response = gate.segment("some text").await.unwrap();
        assert_eq!(response.segments.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let inner = Arc::new(FlakySegmenter {
            calls: AtomicU32::new(0),
            fail_first: u32::MAX,
        });
        let gate = gate(inner.clone());
        assert!(gate.segment("some text").await.is_err());
        // initial attempt plus three retries
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        struct Broken;
        impl FallbackSegmenter for Broken {
            fn segment<'a>(
                &'a self,
                _request: FallbackRequest,
            ) -> Pin<Box<dyn Future<Output = Result<FallbackResponse>> + Send + 'a>> {
                Box::pin(async { Err(ResolverError::Fallback("bad request".to_string())) })
            }
        }
        let gate = gate(Arc::new(Broken));
        assert!(matches!(
            gate.segment("x").await,
            Err(ResolverError::Fallback(_))
        ));
    }
}
