//! Collapse module - Near-duplicate document detection
//!
//! FAQ collections tend to accumulate near-identical copies of the same
//! document. This module scores pairwise textual similarity (word-shingle
//! Jaccard combined with a SimHash fingerprint) and collapses groups above a
//! threshold down to one canonical copy.

pub mod merge;
pub mod similarity;
