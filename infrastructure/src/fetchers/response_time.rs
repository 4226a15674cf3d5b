//! Target response-time fetcher
//!
//! ALB `TargetResponseTime` for the first target group behind the
//! service: an Average series with latest/max/min (converted to
//! milliseconds), whole-window p50/p90/p99 percentiles, and the current
//! healthy/total target counts. The percentile query is a separate call;
//! CloudWatch refuses Statistics and ExtendedStatistics together.

use super::target_groups::{TargetGroupRef, resolve_target_groups};
use super::{secs_to_ms, to_chrono, to_smithy};
use crate::aws::clients::AwsClients;
use crate::aws::retry::{describe_error, retry_throttled};
use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use aws_sdk_elasticloadbalancingv2::types::TargetHealthStateEnum;
use ecscope_application::ports::metric_fetcher::{FetchError, MetricFetcher};
use ecscope_domain::{
    MetricPoint, MetricSeries, MetricUnit, ResourceHandle, ResponseTimeSummary, SectionName,
    SectionPayload, StatisticsWindow, TimedExtreme,
};

const SOURCE: &str = "cloudwatch/alb-response-time";
const METRIC: &str = "TargetResponseTime";

pub struct ResponseTimeFetcher {
    clients: AwsClients,
}

impl ResponseTimeFetcher {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    fn alb_dimensions(group: &TargetGroupRef) -> (Dimension, Dimension) {
        (
            Dimension::builder()
                .name("LoadBalancer")
                .value(group.lb_dimension.clone())
                .build(),
            Dimension::builder()
                .name("TargetGroup")
                .value(group.tg_dimension.clone())
                .build(),
        )
    }

    async fn average_series(
        &self,
        group: &TargetGroupRef,
        window: &StatisticsWindow,
    ) -> Result<MetricSeries, FetchError> {
        let (lb, tg) = Self::alb_dimensions(group);
        let response = retry_throttled(|| {
            self.clients
                .cloudwatch
                .get_metric_statistics()
                .namespace("AWS/ApplicationELB")
                .metric_name(METRIC)
                .dimensions(lb.clone())
                .dimensions(tg.clone())
                .start_time(to_smithy(window.start))
                .end_time(to_smithy(window.end))
                .period(window.period_seconds as i32)
                .statistics(Statistic::Average)
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let points: Vec<MetricPoint> = response
            .datapoints()
            .iter()
            .filter_map(|dp| {
                let at = dp.timestamp().and_then(to_chrono)?;
                let value = secs_to_ms(dp.average()?);
                Some(MetricPoint { at, value })
            })
            .collect();
        Ok(MetricSeries::new(
            SOURCE,
            METRIC,
            MetricUnit::Milliseconds,
            points,
            *window,
        ))
    }

    /// Whole-window percentiles in one datapoint.
    async fn percentiles(
        &self,
        group: &TargetGroupRef,
        window: &StatisticsWindow,
    ) -> Result<(Option<f64>, Option<f64>, Option<f64>), FetchError> {
        let (lb, tg) = Self::alb_dimensions(group);
        let response = retry_throttled(|| {
            self.clients
                .cloudwatch
                .get_metric_statistics()
                .namespace("AWS/ApplicationELB")
                .metric_name(METRIC)
                .dimensions(lb.clone())
                .dimensions(tg.clone())
                .start_time(to_smithy(window.start))
                .end_time(to_smithy(window.end))
                .period(window.span_as_period_seconds() as i32)
                .extended_statistics("p50")
                .extended_statistics("p90")
                .extended_statistics("p99")
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let mut p50 = None;
        let mut p90 = None;
        let mut p99 = None;
        if let Some(stats) = response
            .datapoints()
            .first()
            .and_then(|dp| dp.extended_statistics())
        {
            p50 = stats.get("p50").copied().map(secs_to_ms);
            p90 = stats.get("p90").copied().map(secs_to_ms);
            p99 = stats.get("p99").copied().map(secs_to_ms);
        }
        Ok((p50, p90, p99))
    }

    async fn health_counts(&self, group: &TargetGroupRef) -> Result<(usize, usize), FetchError> {
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
        let healthy = descriptions
            .iter()
            .filter(|d| {
                d.target_health().and_then(|h| h.state()) == Some(&TargetHealthStateEnum::Healthy)
            })
            .count();
        Ok((healthy, descriptions.len()))
    }
}

#[async_trait]
impl MetricFetcher for ResponseTimeFetcher {
    fn section(&self) -> SectionName {
        SectionName::ResponseTime
    }

    async fn fetch(
        &self,
        target: &ResourceHandle,
        window: &StatisticsWindow,
    ) -> Result<SectionPayload, FetchError> {
        let groups = resolve_target_groups(&self.clients, SOURCE, target).await?;
        let Some(group) = groups.first() else {
            return Err(FetchError::NoLoadBalancer);
        };

        let series = self.average_series(group, window).await?;
        let (p50_ms, p90_ms, p99_ms) = self.percentiles(group, window).await?;
        let (healthy_targets, total_targets) = self.health_counts(group).await?;

        let extreme = |point: Option<&MetricPoint>| {
            point.map(|p| TimedExtreme {
                value_ms: p.value,
                at: p.at,
                minutes_ago: window.minutes_before_end(p.at),
            })
        };
        let summary = ResponseTimeSummary {
            group: group.group.clone(),
            load_balancer: group.load_balancer.clone(),
            latest_ms: series.latest().map(|p| p.value),
            maximum: extreme(series.max_point()),
            minimum: extreme(series.min_point()),
            p50_ms,
            p90_ms,
            p99_ms,
            healthy_targets,
            total_targets,
            series: vec![series],
        };
        Ok(SectionPayload::ResponseTime(summary))
    }
}
