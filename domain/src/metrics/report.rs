//! Aggregated reports
//!
//! The terminal artifact returned to the caller. A report always carries
//! one section per requested category; sections fail independently and a
//! failed section never invalidates its siblings.

use super::section::{SectionName, SectionPayload};
use super::window::StatisticsWindow;
use crate::resource::handle::ResourceHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// Data present, no threshold breached
    Ok,
    /// Data present, a threshold breached
    Degraded,
    /// Fetch failed or timed out
    Unavailable,
}

/// One independently fetched slice of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub status: SectionStatus,
    /// Why the section is degraded or unavailable; prose for the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<SectionPayload>,
    /// Error text for unavailable sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportSection {
    pub fn ok(payload: SectionPayload) -> Self {
        Self {
            status: SectionStatus::Ok,
            reason: None,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn degraded(payload: SectionPayload, reason: impl Into<String>) -> Self {
        Self {
            status: SectionStatus::Degraded,
            reason: Some(reason.into()),
            payload: Some(payload),
            error: None,
        }
    }

    /// Build from a payload and its assessed status.
    pub fn from_payload(payload: SectionPayload) -> Self {
        let (status, reason) = payload.assess();
        Self {
            status,
            reason,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            status: SectionStatus::Unavailable,
            reason: Some(reason.clone()),
            payload: None,
            error: Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == SectionStatus::Ok
    }
}

/// Multi-source health report for one resolved resource.
///
/// Sections are keyed by [`SectionName`] in a `BTreeMap`, so assembly
/// order is stable even though fetch completion order is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub target: ResourceHandle,
    pub window: StatisticsWindow,
    pub sections: BTreeMap<SectionName, ReportSection>,
    pub generated_at: DateTime<Utc>,
}

impl AggregatedReport {
    pub fn new(target: ResourceHandle, window: StatisticsWindow) -> Self {
        Self {
            target,
            window,
            sections: BTreeMap::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn insert(&mut self, name: SectionName, section: ReportSection) {
        self.sections.insert(name, section);
    }

    pub fn section(&self, name: SectionName) -> Option<&ReportSection> {
        self.sections.get(&name)
    }

    /// Worst status across all sections: any `Unavailable` or `Degraded`
    /// section makes the whole report non-OK.
    pub fn overall_status(&self) -> SectionStatus {
        let mut worst = SectionStatus::Ok;
        for section in self.sections.values() {
            match section.status {
                SectionStatus::Unavailable => return SectionStatus::Unavailable,
                SectionStatus::Degraded => worst = SectionStatus::Degraded,
                SectionStatus::Ok => {}
            }
        }
        worst
    }
}
