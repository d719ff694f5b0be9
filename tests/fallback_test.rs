//! Pipeline behavior with a fallback segmenter wired in

use indication_resolver::{
    FallbackRequest, FallbackResponse, FallbackSegment, FallbackSegmenter, Pipeline, ProductId,
    ResolverConfig, ResolverError, Snapshot, SnapshotDate, SnapshotEntry,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn snapshots(text: &str) -> Vec<Snapshot> {
    vec![Snapshot {
        date: SnapshotDate::from_ym(2023, 1).unwrap(),
        entries: vec![SnapshotEntry {
            product_id: ProductId::from("P1"),
            text: text.to_string(),
            dossier: None,
            brand: None,
            substance: None,
        }],
    }]
}

fn pipeline() -> Pipeline {
    Pipeline::new(ResolverConfig {
        fallback_retry_base_delay: Duration::from_millis(1),
        ..ResolverConfig::default()
    })
}

/// Splits any request into two blocks at the word "sowie".
struct SplittingSegmenter;

impl FallbackSegmenter for SplittingSegmenter {
    fn segment<'a>(
        &'a self,
        request: FallbackRequest,
    ) -> Pin<Box<dyn Future<Output = indication_resolver::Result<FallbackResponse>> + Send + 'a>>
    {
        Box::pin(async move {
            let Some((first, second)) = request.text.split_once(" sowie ") else {
                return Ok(FallbackResponse {
                    is_multi_indication: false,
                    segments: Vec::new(),
                });
            };
            Ok(FallbackResponse {
                is_multi_indication: true,
                segments: vec![
                    FallbackSegment {
                        text: first.to_string(),
                        suggested_name: Some("Erste Indikation".to_string()),
                    },
                    FallbackSegment {
                        text: second.to_string(),
                        suggested_name: None,
                    },
                ],
            })
        })
    }
}

/// Always fails with a transient error.
struct UnavailableSegmenter {
    calls: AtomicU32,
}

impl FallbackSegmenter for UnavailableSegmenter {
    fn segment<'a>(
        &'a self,
        _request: FallbackRequest,
    ) -> Pin<Box<dyn Future<Output = indication_resolver::Result<FallbackResponse>> + Send + 'a>>
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(ResolverError::FallbackTransient("unavailable".to_string())) })
    }
}

/// Marker-free prose splits through the fallback, and the resulting
/// segments resolve from their embedded codes.
#[tokio::test]
async fn fallback_segments_are_adopted_and_resolved() -> indication_resolver::Result<()> {
    let snaps = snapshots(
        "Erste Behandlung unter 1234.01 sowie zweite Behandlung unter 1234.02 vergütet.",
    );
    let output = pipeline().run(&snaps, Some(Arc::new(SplittingSegmenter))).await?;

    assert_eq!(output.segments.len(), 2);
    assert_eq!(
        output.segments.iter().filter(|s| s.resolution.is_some()).count(),
        2
    );
    assert_eq!(output.intervals.len(), 2);
    Ok(())
}

/// A single-indication verdict keeps the clause whole without a flag.
#[tokio::test]
async fn single_indication_verdict_keeps_clause_whole() -> indication_resolver::Result<()> {
    let snaps = snapshots("Nur eine Behandlung, vergütet unter 1234.01.");
    let output = pipeline().run(&snaps, Some(Arc::new(SplittingSegmenter))).await?;

    assert_eq!(output.segments.len(), 1);
    assert!(!output.segments[0].needs_review);
    Ok(())
}

/// Exhausted retries degrade to a whole-clause segment flagged for
/// review instead of failing the run.
#[tokio::test]
async fn exhausted_retries_flag_the_clause() -> indication_resolver::Result<()> {
    let segmenter = Arc::new(UnavailableSegmenter {
        calls: AtomicU32::new(0),
    });
    let snaps = snapshots("Prosa ohne Marker und ohne Code.");
    let output = pipeline().run(&snaps, Some(segmenter.clone())).await?;

    assert_eq!(output.segments.len(), 1);
    assert!(output.segments[0].needs_review);
    // initial attempt plus the configured retries
    assert_eq!(segmenter.calls.load(Ordering::SeqCst), 4);
    Ok(())
}

/// Clauses with structural markers never reach the fallback.
#[tokio::test]
async fn structural_clauses_bypass_the_fallback() -> indication_resolver::Result<()> {
    let segmenter = Arc::new(UnavailableSegmenter {
        calls: AtomicU32::new(0),
    });
    let snaps = snapshots("<b>Indication A</b> text-a <b>Indication B</b> text-b");
    let output = pipeline().run(&snaps, Some(segmenter.clone())).await?;

    assert_eq!(output.segments.len(), 2);
    assert_eq!(segmenter.calls.load(Ordering::SeqCst), 0);
    Ok(())
}
