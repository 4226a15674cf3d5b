//! Request metrics fetcher
//!
//! Per target group behind the service: whole-window sums of the HTTP
//! status-code counters, total request count, requests per target, and
//! the current target health counts. Totals roll up across groups.

use super::target_groups::{TargetGroupRef, resolve_target_groups};
use super::to_smithy;
use crate::aws::clients::AwsClients;
use crate::aws::retry::{describe_error, retry_throttled};
use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use aws_sdk_elasticloadbalancingv2::types::TargetHealthStateEnum;
use ecscope_application::ports::metric_fetcher::{FetchError, MetricFetcher};
use ecscope_domain::{
    RequestSummary, ResourceHandle, SectionName, SectionPayload, StatisticsWindow,
    StatusCodeCounts, TargetGroupRequests,
};

const SOURCE: &str = "cloudwatch/alb-requests";

pub struct RequestsFetcher {
    clients: AwsClients,
}

impl RequestsFetcher {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    /// Whole-window sum of one ALB metric.
    async fn metric_sum(
        &self,
        group: &TargetGroupRef,
        metric_name: &'static str,
        window: &StatisticsWindow,
    ) -> Result<u64, FetchError> {
        let response = retry_throttled(|| {
            self.clients
                .cloudwatch
                .get_metric_statistics()
                .namespace("AWS/ApplicationELB")
                .metric_name(metric_name)
                .dimensions(
                    Dimension::builder()
                        .name("LoadBalancer")
                        .value(group.lb_dimension.clone())
                        .build(),
                )
                .dimensions(
                    Dimension::builder()
                        .name("TargetGroup")
                        .value(group.tg_dimension.clone())
                        .build(),
                )
                .start_time(to_smithy(window.start))
                .end_time(to_smithy(window.end))
                .period(window.span_as_period_seconds() as i32)
                .statistics(Statistic::Sum)
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let total: f64 = response
            .datapoints()
            .iter()
            .filter_map(|dp| dp.sum())
            .sum();
        Ok(total.max(0.0) as u64)
    }

    async fn group_requests(
        &self,
        group: &TargetGroupRef,
        window: &StatisticsWindow,
    ) -> Result<TargetGroupRequests, FetchError> {
        let status_codes = StatusCodeCounts {
            c2xx: self.metric_sum(group, "HTTPCode_Target_2XX_Count", window).await?,
            c3xx: self.metric_sum(group, "HTTPCode_Target_3XX_Count", window).await?,
            c4xx: self.metric_sum(group, "HTTPCode_Target_4XX_Count", window).await?,
            c5xx: self.metric_sum(group, "HTTPCode_Target_5XX_Count", window).await?,
        };
        let total_requests = self.metric_sum(group, "RequestCount", window).await?;
        let requests_per_target = self
            .metric_sum(group, "RequestCountPerTarget", window)
            .await?;

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
        let healthy_targets = descriptions
            .iter()
            .filter(|d| {
                d.target_health().and_then(|h| h.state()) == Some(&TargetHealthStateEnum::Healthy)
            })
            .count();

        Ok(TargetGroupRequests {
            group: group.group.clone(),
            status_codes,
            total_requests,
            requests_per_target,
            healthy_targets,
            total_targets: descriptions.len(),
        })
    }
}

#[async_trait]
impl MetricFetcher for RequestsFetcher {
    fn section(&self) -> SectionName {
        SectionName::Requests
    }

    async fn fetch(
        &self,
        target: &ResourceHandle,
        window: &StatisticsWindow,
    ) -> Result<SectionPayload, FetchError> {
        let groups = resolve_target_groups(&self.clients, SOURCE, target).await?;
        let mut summaries = Vec::with_capacity(groups.len());
        for group in &groups {
            summaries.push(self.group_requests(group, window).await?);
        }
        Ok(SectionPayload::Requests(RequestSummary::from_groups(
            summaries,
        )))
    }
}
