//! Clause canonicalization
//!
//! Normalizes raw limitation clauses into stable canonical texts,
//! computes content fingerprints and deduplicates identical clauses
//! across snapshots and products.

pub mod fingerprint;
pub mod normalize;
pub mod store;

pub use fingerprint::fingerprint_text;
pub use normalize::{fold_text, normalize_clause, normalize_name, strip_markup, token_sorted};
pub use store::{ClauseStore, canonicalize};
