//! Disambiguation advisor port
//!
//! Optional semantic tier consulted by the resolver when lexical scoring
//! leaves multiple high-confidence candidates. The deterministic lexical
//! path must function with this collaborator entirely absent.

use async_trait::async_trait;
use ecscope_domain::MatchCandidate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("advisor request failed: {0}")]
    RequestFailed(String),

    #[error("advisor returned an unparseable answer: {0}")]
    BadAnswer(String),
}

/// Picks among already-scored candidates.
#[async_trait]
pub trait DisambiguationAdvisor: Send + Sync {
    /// Return the `id` of the chosen candidate, or `None` when the
    /// advisor declines to choose. An id naming no candidate is treated
    /// as declining.
    async fn pick(
        &self,
        query: &str,
        candidates: &[MatchCandidate],
    ) -> Result<Option<String>, AdvisorError>;
}
