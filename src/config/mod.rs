//! Configuration for the resolution engine.

use std::time::Duration;

/// Configuration for a pipeline run
///
/// The fuzzy-matching thresholds are policy parameters tuned against a
/// labeled validation set, not structural constants.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Minimum similarity score for a fuzzy match to be accepted
    pub fuzzy_accept_threshold: f64,
    /// Minimum lead over the second-best candidate for a fuzzy match
    pub fuzzy_margin: f64,
    /// Relaxed acceptance threshold when one name is a prefix of the other
    pub fuzzy_prefix_threshold: f64,
    /// Maximum reconciliation passes over the segment store
    pub max_reconciliation_passes: usize,
    /// Maximum concurrent outstanding fallback segmenter calls
    pub fallback_concurrency: usize,
    /// Retry attempts for transient fallback segmenter failures
    pub fallback_max_retries: u32,
    /// Base delay for fallback retry backoff (doubled per attempt)
    pub fallback_retry_base_delay: Duration,
    /// Clause length (chars) above which the fallback gets a long-text hint
    pub fallback_long_text_threshold: usize,
    /// Whether to use parallel processing for per-clause phases
    pub use_parallel: bool,
    /// Minimum number of items before switching to parallel processing
    pub parallel_threshold: usize,
    /// Show progress bars during long phases
    pub show_progress: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_accept_threshold: 0.90,
            fuzzy_margin: 0.05,
            fuzzy_prefix_threshold: 0.92,
            max_reconciliation_passes: 8,
            fallback_concurrency: 100,
            fallback_max_retries: 3,
            fallback_retry_base_delay: Duration::from_secs(2),
            fallback_long_text_threshold: 2000,
            use_parallel: true,
            parallel_threshold: 256,
            show_progress: false,
        }
    }
}
