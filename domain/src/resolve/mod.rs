//! Name resolution
//!
//! Turns an error-prone free-text lookup into a deterministic,
//! explainable ranking. [`normalize`] strips decoration from candidate
//! text, [`score`] computes per-entry similarity, and [`ranking`] applies
//! the confidence thresholds that decide between `Resolved`, `Ambiguous`,
//! and `NotFound`.

pub mod normalize;
pub mod ranking;
pub mod score;
