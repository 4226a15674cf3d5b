//! Domain layer for ecscope
//!
//! This crate contains the core data model and deterministic logic:
//! resource handles and inventory snapshots, the lexical name-ranking
//! engine, metric series and report types, and tool definitions.
//! It has no dependencies on infrastructure concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Resolution
//!
//! A free-text candidate name is ranked against an inventory snapshot and
//! produces exactly one of three outcomes: `Resolved`, `Ambiguous` (the
//! caller must choose), or `NotFound`. Ambiguity is surfaced as data,
//! never guessed away.
//!
//! ## Reports
//!
//! An [`AggregatedReport`] always carries one section per requested
//! metric category. Sections fail independently; a failed section is
//! marked `Unavailable` without invalidating its siblings.

pub mod metrics;
pub mod resolve;
pub mod resource;
pub mod tool;

// Re-export commonly used types
pub use metrics::{
    assess::HealthBand,
    report::{AggregatedReport, ReportSection, SectionStatus},
    section::{
        ContainerImage, ContainerProblem, DeploymentSummary, RequestSummary, ResponseTimeSummary,
        RolloutInfo, SectionName, SectionPayload, ServiceListing, StatBand, StatusCodeCounts,
        TargetGroupHealth, TargetGroupRequests, TargetHealthSummary, TaskProblem, TimedExtreme,
        UnhealthyTarget,
        UtilizationSummary,
    },
    series::{MetricPoint, MetricSeries, MetricUnit},
    window::StatisticsWindow,
};
pub use resolve::{
    normalize::normalize_candidate,
    ranking::{MatchCandidate, ResolutionResult, ResolverThresholds, rank},
};
pub use resource::{
    handle::ResourceHandle,
    kind::ResourceKind,
    scope::Scope,
    snapshot::InventorySnapshot,
};
pub use tool::{ToolDefinition, ToolParameter, validate_arguments};
