//! Name resolver service
//!
//! Two tiers. The lexical tier ranks the candidate text against the
//! cached inventory deterministically. The optional semantic tier asks a
//! [`DisambiguationAdvisor`] to choose — but only between candidates the
//! lexical tier already scored at or above the high-confidence
//! threshold. Below that threshold ambiguity always goes back to the
//! caller; the resolver never guesses.

use crate::inventory::InventoryCache;
use crate::ports::advisor::DisambiguationAdvisor;
use crate::ports::inventory_source::{InventoryError, InventorySource};
use ecscope_domain::{
    MatchCandidate, ResolutionResult, ResolverThresholds, ResourceKind, Scope, rank,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors fatal to a resolution attempt. `Ambiguous` and `NotFound` are
/// typed outcomes, not errors.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Resolves free-text names to concrete resource handles.
pub struct NameResolver<S> {
    inventory: Arc<InventoryCache<S>>,
    thresholds: ResolverThresholds,
    advisor: Option<Arc<dyn DisambiguationAdvisor>>,
}

impl<S: InventorySource> NameResolver<S> {
    pub fn new(inventory: Arc<InventoryCache<S>>, thresholds: ResolverThresholds) -> Self {
        Self {
            inventory,
            thresholds,
            advisor: None,
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn DisambiguationAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Resolve `candidate_text` to a resource of `kind` within `scope`.
    pub async fn resolve(
        &self,
        candidate_text: &str,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<ResolutionResult, ResolveError> {
        let snapshot = self.inventory.list(kind, scope).await?;
        let result = rank(candidate_text, &snapshot.entries, &self.thresholds);
        match result {
            ResolutionResult::Ambiguous(candidates) => {
                self.try_advisor(candidate_text, candidates).await
            }
            other => Ok(other),
        }
    }

    /// Resolve a service name searching every cluster in the region.
    pub async fn resolve_service(
        &self,
        candidate_text: &str,
    ) -> Result<ResolutionResult, ResolveError> {
        self.resolve(candidate_text, ResourceKind::Service, &Scope::Region)
            .await
    }

    /// Consult the advisor for high-confidence ties only. Anything the
    /// advisor cannot settle stays ambiguous.
    async fn try_advisor(
        &self,
        query: &str,
        candidates: Vec<MatchCandidate>,
    ) -> Result<ResolutionResult, ResolveError> {
        let eligible = candidates.len() >= 2
            && candidates
                .iter()
                .all(|c| c.score >= self.thresholds.high_confidence);

        let advisor = match (&self.advisor, eligible) {
            (Some(advisor), true) => advisor,
            _ => return Ok(ResolutionResult::Ambiguous(candidates)),
        };

        match advisor.pick(query, &candidates).await {
            Ok(Some(id)) => {
                if let Some(chosen) = candidates.iter().find(|c| c.handle.id == id) {
                    debug!(query, id = %chosen.handle.id, "advisor settled tie");
                    let mut chosen = chosen.clone();
                    chosen.reason = format!("{} (semantic disambiguation)", chosen.reason);
                    return Ok(ResolutionResult::Resolved(chosen));
                }
                warn!(query, id, "advisor named an unknown candidate; keeping ambiguity");
                Ok(ResolutionResult::Ambiguous(candidates))
            }
            Ok(None) => Ok(ResolutionResult::Ambiguous(candidates)),
            Err(e) => {
                warn!(query, error = %e, "advisor unavailable; keeping ambiguity");
                Ok(ResolutionResult::Ambiguous(candidates))
            }
        }
    }
}
