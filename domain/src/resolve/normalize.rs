//! Candidate text normalization
//!
//! Callers hand us names copied out of consoles, logs, and chat
//! transcripts. Normalization strips the decoration so scoring compares
//! like with like: whitespace and quotes trimmed, case folded, ARNs
//! reduced to their final path segment.

use crate::resource::handle::arn_final_segment;

/// Normalize a free-text candidate for matching.
pub fn normalize_candidate(text: &str) -> String {
    let trimmed = text.trim().trim_matches(|c| c == '"' || c == '\'');
    let stripped = if trimmed.starts_with("arn:") {
        arn_final_segment(trimmed)
    } else {
        trimmed
    };
    stripped.to_lowercase()
}
