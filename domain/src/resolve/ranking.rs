//! Candidate ranking
//!
//! Applies confidence thresholds to per-entry similarity scores and
//! produces the resolution outcome. The thresholds are tunable values,
//! not constants; defaults live in [`ResolverThresholds::default`].

use super::normalize::normalize_candidate;
use super::score::similarity;
use crate::resource::handle::ResourceHandle;
use serde::{Deserialize, Serialize};

/// Tunable knobs for the ranking decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResolverThresholds {
    /// Score at or above which a clear winner resolves automatically
    pub high_confidence: f64,
    /// Top-two score gap below which candidates are treated as tied
    pub ambiguity_margin: f64,
    /// Minimum score for a name to be considered a candidate at all
    pub floor: f64,
    /// Maximum number of candidates returned in an ambiguous outcome
    pub max_candidates: usize,
}

impl Default for ResolverThresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.85,
            ambiguity_margin: 0.05,
            floor: 0.35,
            max_candidates: 5,
        }
    }
}

/// One scored inventory entry. Transient, produced per resolution call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub handle: ResourceHandle,
    pub score: f64,
    /// Which rule produced the score, suitable for surfacing to a caller
    pub reason: String,
}

/// Outcome of ranking one candidate text against one inventory.
#[derive(Debug, Clone)]
pub enum ResolutionResult {
    /// A single clear winner
    Resolved(MatchCandidate),
    /// Plausible matches the caller must choose between, best first
    Ambiguous(Vec<MatchCandidate>),
    /// Nothing scored above the floor
    NotFound,
}

impl ResolutionResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }
}

/// Rank `candidate_text` against `entries`.
///
/// An exact match on id or display name wins immediately with score 1.0,
/// so `web-service` resolves to `web-service` even when
/// `web-service-canary` is also present. Otherwise the thresholds decide:
/// a high-confidence winner with a clear margin resolves, tied or
/// mid-confidence candidates come back as `Ambiguous`, and anything
/// below the floor is dropped.
pub fn rank(
    candidate_text: &str,
    entries: &[ResourceHandle],
    thresholds: &ResolverThresholds,
) -> ResolutionResult {
    let query = normalize_candidate(candidate_text);
    if query.is_empty() {
        return ResolutionResult::NotFound;
    }

    for entry in entries {
        if normalize_candidate(&entry.display_name) == query
            || normalize_candidate(&entry.id) == query
        {
            return ResolutionResult::Resolved(MatchCandidate {
                handle: entry.clone(),
                score: 1.0,
                reason: "exact match".to_string(),
            });
        }
    }

    let mut scored: Vec<MatchCandidate> = entries
        .iter()
        .map(|entry| {
            let s = similarity(&query, &normalize_candidate(&entry.display_name));
            MatchCandidate {
                handle: entry.clone(),
                score: s.score,
                reason: s.rule.to_string(),
            }
        })
        .filter(|c| c.score >= thresholds.floor)
        .collect();

    if scored.is_empty() {
        return ResolutionResult::NotFound;
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.handle.display_name.cmp(&b.handle.display_name))
    });

    let top = scored[0].score;
    let runner_up = scored.get(1).map(|c| c.score);
    let clear_margin = runner_up
        .map(|second| top - second >= thresholds.ambiguity_margin)
        .unwrap_or(true);

    if top >= thresholds.high_confidence && clear_margin {
        if let Some(winner) = scored.into_iter().next() {
            return ResolutionResult::Resolved(winner);
        }
        return ResolutionResult::NotFound;
    }

    scored.truncate(thresholds.max_candidates);
    ResolutionResult::Ambiguous(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::kind::ResourceKind;

    fn service(name: &str) -> ResourceHandle {
        ResourceHandle::new(
            ResourceKind::Service,
            format!("arn:aws:ecs:us-east-1:123456789012:service/prod/{name}"),
            name,
        )
    }

    fn thresholds() -> ResolverThresholds {
        ResolverThresholds::default()
    }

    #[test]
    fn exact_name_resolves_with_score_one() {
        let entries = vec![service("web-service"), service("checkout")];
        match rank("web-service", &entries, &thresholds()) {
            ResolutionResult::Resolved(c) => {
                assert_eq!(c.score, 1.0);
                assert_eq!(c.handle.display_name, "web-service");
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn exact_match_beats_fuzzy_superset() {
        let entries = vec![service("web-service"), service("web-service-canary")];
        match rank("web-service", &entries, &thresholds()) {
            ResolutionResult::Resolved(c) => {
                assert_eq!(c.handle.display_name, "web-service");
                assert_eq!(c.score, 1.0);
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let entries = vec![service("Web-Service")];
        assert!(rank("web-service", &entries, &thresholds()).is_resolved());
    }

    #[test]
    fn zero_overlap_is_not_found() {
        let entries = vec![service("web-service"), service("checkout")];
        match rank("zzzzqqq", &entries, &thresholds()) {
            ResolutionResult::NotFound => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn near_tie_is_ambiguous_ordered_by_score() {
        let entries = vec![service("prod-api2"), service("prod-api")];
        match rank("prod-ap", &entries, &thresholds()) {
            ResolutionResult::Ambiguous(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert_eq!(candidates[0].handle.display_name, "prod-api");
                assert_eq!(candidates[1].handle.display_name, "prod-api2");
                assert!(candidates[0].score >= candidates[1].score);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn clear_winner_above_threshold_resolves() {
        let entries = vec![service("payment-gateway"), service("checkout")];
        match rank("payment-gatewa", &entries, &thresholds()) {
            ResolutionResult::Resolved(c) => {
                assert_eq!(c.handle.display_name, "payment-gateway");
                assert!(c.score >= 0.85);
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn mid_confidence_single_candidate_is_ambiguous() {
        let entries = vec![service("payment-gateway"), service("checkout")];
        match rank("gateway", &entries, &thresholds()) {
            ResolutionResult::Ambiguous(candidates) => {
                assert_eq!(candidates[0].handle.display_name, "payment-gateway");
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn arn_input_matches_by_final_segment() {
        let entries = vec![service("web-api")];
        let result = rank(
            "arn:aws:ecs:us-east-1:123456789012:service/prod/web-api",
            &entries,
            &thresholds(),
        );
        assert!(result.is_resolved());
    }

    #[test]
    fn candidate_list_is_capped() {
        let entries: Vec<_> = (0..10).map(|i| service(&format!("api-{i}"))).collect();
        match rank("api", &entries, &thresholds()) {
            ResolutionResult::Ambiguous(candidates) => {
                assert!(candidates.len() <= thresholds().max_candidates);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }
}
