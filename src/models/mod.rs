//! Core entity types for the resolution engine
//!
//! These are the four persisted tables (clauses, dictionary entries,
//! segments, validity intervals) plus the snapshot input types. All of
//! them serialize so downstream persistence and export can consume them
//! without knowing the engine internals.

pub mod clause;
pub mod dictionary;
pub mod interval;
pub mod segment;
pub mod snapshot;

pub use clause::{Clause, Fingerprint, Occurrence};
pub use dictionary::{ConfidenceTier, DictionaryEntry, EntryEvidence, IndicationCode};
pub use interval::ValidityInterval;
pub use segment::{Resolution, ResolutionSource, Segment, SegmentOrigin};
pub use snapshot::{ProductId, Snapshot, SnapshotDate, SnapshotEntry};
