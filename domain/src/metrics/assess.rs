//! Section status rules
//!
//! Turns a fetched payload into `Ok` or `Degraded` plus a reason string
//! readable by an LLM caller. Thresholds: running below desired, a FAILED
//! rollout, any unhealthy target or container, utilization past the
//! warning band, or any server error in the window.

use super::report::SectionStatus;
use super::section::{
    DeploymentSummary, RequestSummary, ResponseTimeSummary, SectionPayload, TargetHealthSummary,
    UtilizationSummary,
};
use serde::{Deserialize, Serialize};

/// Utilization band, following the 80/90 % warning/critical split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Healthy,
    Warning,
    Critical,
    /// No datapoints in the window (e.g. a service scaled to zero)
    Unknown,
}

const WARNING_UTILIZATION: f64 = 80.0;
const CRITICAL_UTILIZATION: f64 = 90.0;

impl HealthBand {
    pub fn from_averages(cpu: Option<f64>, memory: Option<f64>) -> Self {
        let (cpu, memory) = match (cpu, memory) {
            (Some(c), Some(m)) => (c, m),
            _ => return HealthBand::Unknown,
        };
        let peak = cpu.max(memory);
        if peak > CRITICAL_UTILIZATION {
            HealthBand::Critical
        } else if peak > WARNING_UTILIZATION {
            HealthBand::Warning
        } else {
            HealthBand::Healthy
        }
    }
}

impl SectionPayload {
    /// Derive the section status and, for degraded sections, a reason.
    pub fn assess(&self) -> (SectionStatus, Option<String>) {
        match self {
            SectionPayload::Deployment(d) => assess_deployment(d),
            SectionPayload::Utilization(u) => assess_utilization(u),
            SectionPayload::TargetHealth(t) => assess_target_health(t),
            SectionPayload::ResponseTime(r) => assess_response_time(r),
            SectionPayload::Requests(r) => assess_requests(r),
        }
    }
}

fn assess_deployment(d: &DeploymentSummary) -> (SectionStatus, Option<String>) {
    if d.running_count < d.desired_count {
        return (
            SectionStatus::Degraded,
            Some(format!(
                "running {} of {} desired tasks",
                d.running_count, d.desired_count
            )),
        );
    }
    if let Some(rollout) = &d.rollout
        && rollout.is_failed()
    {
        return (
            SectionStatus::Degraded,
            Some(format!(
                "deployment rollout failed with {} failed tasks",
                rollout.failed
            )),
        );
    }
    if !d.unhealthy_tasks.is_empty() {
        return (
            SectionStatus::Degraded,
            Some(format!(
                "{} running task(s) report containers outside RUNNING state",
                d.unhealthy_tasks.len()
            )),
        );
    }
    (SectionStatus::Ok, None)
}

fn assess_utilization(u: &UtilizationSummary) -> (SectionStatus, Option<String>) {
    match u.band {
        HealthBand::Critical | HealthBand::Warning => {
            let cpu = u.cpu.map(|b| b.average).unwrap_or(0.0);
            let memory = u.memory.map(|b| b.average).unwrap_or(0.0);
            (
                SectionStatus::Degraded,
                Some(format!(
                    "utilization {}: cpu {:.1}%, memory {:.1}%",
                    match u.band {
                        HealthBand::Critical => "critical",
                        _ => "elevated",
                    },
                    cpu, memory
                )),
            )
        }
        _ => (SectionStatus::Ok, None),
    }
}

fn assess_target_health(t: &TargetHealthSummary) -> (SectionStatus, Option<String>) {
    let unhealthy = t.unhealthy_total();
    if unhealthy > 0 {
        (
            SectionStatus::Degraded,
            Some(format!("{unhealthy} unhealthy target(s)")),
        )
    } else {
        (SectionStatus::Ok, None)
    }
}

fn assess_response_time(r: &ResponseTimeSummary) -> (SectionStatus, Option<String>) {
    if r.healthy_targets < r.total_targets {
        (
            SectionStatus::Degraded,
            Some(format!(
                "{} of {} targets healthy",
                r.healthy_targets, r.total_targets
            )),
        )
    } else {
        (SectionStatus::Ok, None)
    }
}

fn assess_requests(r: &RequestSummary) -> (SectionStatus, Option<String>) {
    if r.totals.c5xx > 0 {
        (
            SectionStatus::Degraded,
            Some(format!("{} server error(s) (5xx) in window", r.totals.c5xx)),
        )
    } else {
        (SectionStatus::Ok, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::section::{StatBand, StatusCodeCounts, TargetGroupHealth, UnhealthyTarget};
    use crate::resource::handle::ResourceHandle;
    use crate::resource::kind::ResourceKind;

    fn deployment(running: i32, desired: i32) -> DeploymentSummary {
        DeploymentSummary {
            running_count: running,
            desired_count: desired,
            pending_count: 0,
            rollout: None,
            containers: vec![],
            unhealthy_tasks: vec![],
        }
    }

    #[test]
    fn running_below_desired_is_degraded_with_counts() {
        let (status, reason) = SectionPayload::Deployment(deployment(2, 5)).assess();
        assert_eq!(status, SectionStatus::Degraded);
        let reason = reason.unwrap();
        assert!(reason.contains('2') && reason.contains('5'), "reason: {reason}");
    }

    #[test]
    fn running_equal_desired_is_ok() {
        let (status, reason) = SectionPayload::Deployment(deployment(3, 3)).assess();
        assert_eq!(status, SectionStatus::Ok);
        assert!(reason.is_none());
    }

    #[test]
    fn failed_rollout_is_degraded() {
        let mut d = deployment(3, 3);
        d.rollout = Some(crate::metrics::section::RolloutInfo {
            state: "FAILED".to_string(),
            running: 1,
            pending: 0,
            failed: 2,
            task_definition: None,
        });
        let (status, reason) = SectionPayload::Deployment(d).assess();
        assert_eq!(status, SectionStatus::Degraded);
        assert!(reason.unwrap().contains("rollout failed"));
    }

    #[test]
    fn unhealthy_targets_degrade() {
        let summary = TargetHealthSummary {
            groups: vec![TargetGroupHealth {
                group: ResourceHandle::new(ResourceKind::TargetGroup, "tg", "tg"),
                healthy: 2,
                unhealthy: 1,
                unhealthy_targets: vec![UnhealthyTarget {
                    id: "10.0.0.1".to_string(),
                    state: "unhealthy".to_string(),
                    reason: None,
                }],
            }],
        };
        let (status, reason) = SectionPayload::TargetHealth(summary).assess();
        assert_eq!(status, SectionStatus::Degraded);
        assert!(reason.unwrap().contains("1 unhealthy"));
    }

    #[test]
    fn utilization_bands() {
        assert_eq!(
            HealthBand::from_averages(Some(95.0), Some(40.0)),
            HealthBand::Critical
        );
        assert_eq!(
            HealthBand::from_averages(Some(50.0), Some(85.0)),
            HealthBand::Warning
        );
        assert_eq!(
            HealthBand::from_averages(Some(50.0), Some(40.0)),
            HealthBand::Healthy
        );
        assert_eq!(HealthBand::from_averages(None, Some(40.0)), HealthBand::Unknown);
    }

    #[test]
    fn critical_utilization_degrades() {
        let band = |avg| Some(StatBand { average: avg, maximum: avg, minimum: avg });
        let summary = UtilizationSummary::new(band(95.0), band(40.0), vec![]);
        assert_eq!(summary.band, HealthBand::Critical);
        let (status, reason) = SectionPayload::Utilization(summary).assess();
        assert_eq!(status, SectionStatus::Degraded);
        assert!(reason.unwrap().contains("critical"));
    }

    #[test]
    fn missing_datapoints_do_not_degrade() {
        let summary = UtilizationSummary::new(None, None, vec![]);
        assert_eq!(summary.band, HealthBand::Unknown);
        let (status, _) = SectionPayload::Utilization(summary).assess();
        assert_eq!(status, SectionStatus::Ok);
    }

    #[test]
    fn server_errors_degrade_requests() {
        let summary = RequestSummary {
            groups: vec![],
            totals: StatusCodeCounts { c2xx: 100, c3xx: 0, c4xx: 2, c5xx: 7 },
            total_requests: 109,
        };
        let (status, reason) = SectionPayload::Requests(summary).assess();
        assert_eq!(status, SectionStatus::Degraded);
        assert!(reason.unwrap().contains('7'));
    }
}
