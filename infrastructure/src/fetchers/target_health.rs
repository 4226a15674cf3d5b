//! Target group health fetcher
//!
//! Healthy/unhealthy counts per target group attached to the service,
//! with per-target state and reason for everything not healthy. A
//! service without a load balancer is a valid (empty) answer here, not a
//! failure.

use super::target_groups::{TargetGroupRef, resolve_target_groups};
use crate::aws::clients::AwsClients;
use crate::aws::retry::{describe_error, retry_throttled};
use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2::types::TargetHealthStateEnum;
use ecscope_application::ports::metric_fetcher::{FetchError, MetricFetcher};
use ecscope_domain::{
    ResourceHandle, SectionName, SectionPayload, StatisticsWindow, TargetGroupHealth,
    TargetHealthSummary, UnhealthyTarget,
};

const SOURCE: &str = "elbv2/target-health";

pub struct TargetHealthFetcher {
    clients: AwsClients,
}

impl TargetHealthFetcher {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    async fn group_health(&self, group: &TargetGroupRef) -> Result<TargetGroupHealth, FetchError> {
        let health = retry_throttled(|| {
            self.clients
                .elbv2
                .describe_target_health()
                .target_group_arn(group.group.id.clone())
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let descriptions = health.target_health_descriptions();
        let mut healthy = 0usize;
        let mut unhealthy_targets = Vec::new();
        for description in descriptions {
            let state = description.target_health().and_then(|h| h.state());
            if state == Some(&TargetHealthStateEnum::Healthy) {
                healthy += 1;
                continue;
            }
            unhealthy_targets.push(UnhealthyTarget {
                id: description
                    .target()
                    .and_then(|t| t.id())
                    .unwrap_or("unknown")
                    .to_string(),
                state: state.map(|s| s.as_str().to_string()).unwrap_or_else(|| "unknown".to_string()),
                reason: description
                    .target_health()
                    .and_then(|h| h.description())
                    .map(str::to_string),
            });
        }

        Ok(TargetGroupHealth {
            group: group.group.clone(),
            healthy,
            unhealthy: unhealthy_targets.len(),
            unhealthy_targets,
        })
    }
}

#[async_trait]
impl MetricFetcher for TargetHealthFetcher {
    fn section(&self) -> SectionName {
        SectionName::TargetHealth
    }

    async fn fetch(
        &self,
        target: &ResourceHandle,
        _window: &StatisticsWindow,
    ) -> Result<SectionPayload, FetchError> {
        let groups = match resolve_target_groups(&self.clients, SOURCE, target).await {
            Ok(groups) => groups,
            // No load balancer means nothing to be unhealthy
            Err(FetchError::NoLoadBalancer) => {
                return Ok(SectionPayload::TargetHealth(TargetHealthSummary {
                    groups: Vec::new(),
                }));
            }
            Err(e) => return Err(e),
        };

        let mut summaries = Vec::with_capacity(groups.len());
        for group in &groups {
            summaries.push(self.group_health(group).await?);
        }
        Ok(SectionPayload::TargetHealth(TargetHealthSummary {
            groups: summaries,
        }))
    }
}
