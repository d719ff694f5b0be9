//! A Rust library for reconstructing product-indication validity
//! history from monthly drug-reimbursement registry snapshots, with
//! clause canonicalization, multi-indication segmentation and layered
//! name→code resolution.

pub mod canonical;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod segmenter;
pub mod source;
pub mod temporal;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::ResolverConfig;
pub use error::{ResolverError, Result};
pub use pipeline::{IntervalConflict, Pipeline, PipelineOutput, RunReport};

// Entity types
pub use models::{
    Clause, ConfidenceTier, DictionaryEntry, Fingerprint, IndicationCode, ProductId, Resolution,
    Segment, Snapshot, SnapshotDate, SnapshotEntry, ValidityInterval,
};

// Snapshot input
pub use source::{JsonSnapshotSource, SnapshotSource};

// Fallback segmentation surface
pub use segmenter::{FallbackRequest, FallbackResponse, FallbackSegment, FallbackSegmenter};
