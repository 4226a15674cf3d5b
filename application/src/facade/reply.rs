//! Tool replies
//!
//! The structured object every tool operation returns. Every reply is
//! valid and inspectable even under partial failure; a bare error only
//! appears when resolution itself failed or the arguments were invalid.

use ecscope_domain::{
    AggregatedReport, MatchCandidate, ResourceKind, SectionStatus, ServiceListing,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Ok,
    Ambiguous,
    NotFound,
    Error,
}

/// One plausible match, shaped for surfacing to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub name: String,
    pub id: String,
    pub score: f64,
    pub reason: String,
}

impl From<&MatchCandidate> for CandidateView {
    fn from(c: &MatchCandidate) -> Self {
        Self {
            name: c.handle.display_name.clone(),
            id: c.handle.id.clone(),
            score: (c.score * 1000.0).round() / 1000.0,
            reason: c.reason.clone(),
        }
    }
}

/// Request for the caller to choose among plausible matches.
#[derive(Debug, Clone, Serialize)]
pub struct Disambiguation {
    pub kind: ResourceKind,
    pub query: String,
    /// Best first
    pub candidates: Vec<CandidateView>,
}

/// Reply of one tool operation.
#[derive(Debug, Serialize)]
pub struct ToolReply {
    pub status: ReplyStatus,
    /// Worst section status, present with a report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<SectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AggregatedReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ServiceListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<Disambiguation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolReply {
    pub fn report(report: AggregatedReport) -> Self {
        Self {
            status: ReplyStatus::Ok,
            overall: Some(report.overall_status()),
            report: Some(report),
            listing: None,
            disambiguation: None,
            error: None,
        }
    }

    pub fn listing(listing: ServiceListing) -> Self {
        Self {
            status: ReplyStatus::Ok,
            overall: None,
            report: None,
            listing: Some(listing),
            disambiguation: None,
            error: None,
        }
    }

    pub fn ambiguous(
        kind: ResourceKind,
        query: impl Into<String>,
        candidates: &[MatchCandidate],
    ) -> Self {
        Self {
            status: ReplyStatus::Ambiguous,
            overall: None,
            report: None,
            listing: None,
            disambiguation: Some(Disambiguation {
                kind,
                query: query.into(),
                candidates: candidates.iter().map(CandidateView::from).collect(),
            }),
            error: None,
        }
    }

    pub fn not_found(kind: ResourceKind, query: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::NotFound,
            overall: None,
            report: None,
            listing: None,
            disambiguation: None,
            error: Some(format!(
                "no {} matched '{}' above the confidence floor",
                kind,
                query.into()
            )),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            overall: None,
            report: None,
            listing: None,
            disambiguation: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }
}
