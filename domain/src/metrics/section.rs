//! Report sections and fetcher payloads
//!
//! Each metric source normalizes its native response into one of the
//! [`SectionPayload`] variants below. Section order in a report follows
//! the declaration order of [`SectionName`], never completion order.

use super::series::MetricSeries;
use crate::resource::handle::ResourceHandle;
use serde::{Deserialize, Serialize};

/// Stable identifier of one report section.
///
/// `Ord` follows declaration order and fixes the section order of every
/// report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Deployment,
    Utilization,
    TargetHealth,
    ResponseTime,
    Requests,
}

impl SectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::Deployment => "deployment",
            SectionName::Utilization => "utilization",
            SectionName::TargetHealth => "target_health",
            SectionName::ResponseTime => "response_time",
            SectionName::Requests => "requests",
        }
    }
}

impl std::fmt::Display for SectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data carried by one successfully fetched section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionPayload {
    Deployment(DeploymentSummary),
    Utilization(UtilizationSummary),
    TargetHealth(TargetHealthSummary),
    ResponseTime(ResponseTimeSummary),
    Requests(RequestSummary),
}

/// Task and rollout state of one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub running_count: i32,
    pub desired_count: i32,
    pub pending_count: i32,
    /// State of the PRIMARY deployment, if one exists
    pub rollout: Option<RolloutInfo>,
    /// Container images of the active task definition, registry masked
    pub containers: Vec<ContainerImage>,
    /// Tasks with containers not in RUNNING state
    pub unhealthy_tasks: Vec<TaskProblem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutInfo {
    /// COMPLETED, IN_PROGRESS, or FAILED
    pub state: String,
    pub running: i32,
    pub pending: i32,
    pub failed: i32,
    /// Task definition revision (family:revision)
    pub task_definition: Option<String>,
}

impl RolloutInfo {
    pub fn is_failed(&self) -> bool {
        self.state.eq_ignore_ascii_case("FAILED")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerImage {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProblem {
    pub task: ResourceHandle,
    pub status: String,
    pub containers: Vec<ContainerProblem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerProblem {
    pub name: String,
    pub status: String,
    pub reason: Option<String>,
}

/// Latest average/maximum/minimum of one statistic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatBand {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
}

/// CPU and memory utilization of one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationSummary {
    pub cpu: Option<StatBand>,
    pub memory: Option<StatBand>,
    pub band: crate::metrics::assess::HealthBand,
    pub series: Vec<MetricSeries>,
}

impl UtilizationSummary {
    /// Build a summary, deriving the health band from the averages.
    pub fn new(
        cpu: Option<StatBand>,
        memory: Option<StatBand>,
        series: Vec<MetricSeries>,
    ) -> Self {
        let band = crate::metrics::assess::HealthBand::from_averages(
            cpu.map(|b| b.average),
            memory.map(|b| b.average),
        );
        Self {
            cpu,
            memory,
            band,
            series,
        }
    }
}

/// Health of the target groups attached to one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetHealthSummary {
    pub groups: Vec<TargetGroupHealth>,
}

impl TargetHealthSummary {
    pub fn unhealthy_total(&self) -> usize {
        self.groups.iter().map(|g| g.unhealthy).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetGroupHealth {
    pub group: ResourceHandle,
    pub healthy: usize,
    pub unhealthy: usize,
    pub unhealthy_targets: Vec<UnhealthyTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnhealthyTarget {
    pub id: String,
    pub state: String,
    pub reason: Option<String>,
}

/// A metric extreme with how long before the window end it occurred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimedExtreme {
    pub value_ms: f64,
    pub at: chrono::DateTime<chrono::Utc>,
    pub minutes_ago: i64,
}

/// Response-time picture of one target group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeSummary {
    pub group: ResourceHandle,
    pub load_balancer: ResourceHandle,
    /// Most recent average response time in the window
    pub latest_ms: Option<f64>,
    pub maximum: Option<TimedExtreme>,
    pub minimum: Option<TimedExtreme>,
    pub p50_ms: Option<f64>,
    pub p90_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub healthy_targets: usize,
    pub total_targets: usize,
    pub series: Vec<MetricSeries>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCodeCounts {
    #[serde(rename = "2xx")]
    pub c2xx: u64,
    #[serde(rename = "3xx")]
    pub c3xx: u64,
    #[serde(rename = "4xx")]
    pub c4xx: u64,
    #[serde(rename = "5xx")]
    pub c5xx: u64,
}

impl StatusCodeCounts {
    pub fn add(&mut self, other: &StatusCodeCounts) {
        self.c2xx += other.c2xx;
        self.c3xx += other.c3xx;
        self.c4xx += other.c4xx;
        self.c5xx += other.c5xx;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetGroupRequests {
    pub group: ResourceHandle,
    pub status_codes: StatusCodeCounts,
    pub total_requests: u64,
    pub requests_per_target: u64,
    pub healthy_targets: usize,
    pub total_targets: usize,
}

/// Request volume and status-code breakdown across the target groups of
/// one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSummary {
    pub groups: Vec<TargetGroupRequests>,
    pub totals: StatusCodeCounts,
    pub total_requests: u64,
}

impl RequestSummary {
    pub fn from_groups(groups: Vec<TargetGroupRequests>) -> Self {
        let mut totals = StatusCodeCounts::default();
        let mut total_requests = 0;
        for g in &groups {
            totals.add(&g.status_codes);
            total_requests += g.total_requests;
        }
        Self {
            groups,
            totals,
            total_requests,
        }
    }
}

/// Services of one cluster, returned by the listing operation without
/// aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceListing {
    pub cluster: ResourceHandle,
    pub services: Vec<String>,
    pub service_count: usize,
}

impl ServiceListing {
    pub fn new(cluster: ResourceHandle, services: Vec<String>) -> Self {
        let service_count = services.len();
        Self {
            cluster,
            services,
            service_count,
        }
    }
}
