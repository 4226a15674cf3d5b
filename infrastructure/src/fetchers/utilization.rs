//! CloudWatch utilization fetcher
//!
//! CPU and memory utilization for one service from the `AWS/ECS`
//! namespace, normalized into metric series plus a latest-datapoint
//! average/maximum/minimum band.

use super::{round2, to_chrono, to_smithy};
use crate::aws::clients::AwsClients;
use crate::aws::retry::{describe_error, retry_throttled};
use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, Statistic};
use ecscope_application::ports::metric_fetcher::{FetchError, MetricFetcher};
use ecscope_domain::{
    MetricPoint, MetricSeries, MetricUnit, ResourceHandle, SectionName, SectionPayload, StatBand,
    StatisticsWindow, UtilizationSummary,
};

const SOURCE: &str = "cloudwatch/ecs";

pub struct UtilizationFetcher {
    clients: AwsClients,
}

impl UtilizationFetcher {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    async fn statistic(
        &self,
        cluster: &str,
        service: &str,
        metric_name: &'static str,
        window: &StatisticsWindow,
    ) -> Result<(Option<StatBand>, MetricSeries), FetchError> {
        let response = retry_throttled(|| {
            self.clients
                .cloudwatch
                .get_metric_statistics()
                .namespace("AWS/ECS")
                .metric_name(metric_name)
                .dimensions(
                    Dimension::builder()
                        .name("ClusterName")
                        .value(cluster)
                        .build(),
                )
                .dimensions(
                    Dimension::builder()
                        .name("ServiceName")
                        .value(service)
                        .build(),
                )
                .start_time(to_smithy(window.start))
                .end_time(to_smithy(window.end))
                .period(window.period_seconds as i32)
                .statistics(Statistic::Average)
                .statistics(Statistic::Maximum)
                .statistics(Statistic::Minimum)
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let datapoints = response.datapoints();
        let points: Vec<MetricPoint> = datapoints
            .iter()
            .filter_map(|dp| {
                let at = dp.timestamp().and_then(to_chrono)?;
                let value = dp.average()?;
                Some(MetricPoint { at, value })
            })
            .collect();
        let series = MetricSeries::new(SOURCE, metric_name, MetricUnit::Percent, points, *window);

        let band = latest_datapoint(datapoints).and_then(|dp| {
            Some(StatBand {
                average: round2(dp.average()?),
                maximum: round2(dp.maximum()?),
                minimum: round2(dp.minimum()?),
            })
        });
        Ok((band, series))
    }
}

fn latest_datapoint(datapoints: &[Datapoint]) -> Option<&Datapoint> {
    datapoints
        .iter()
        .max_by_key(|dp| dp.timestamp().map(|t| t.to_millis().unwrap_or(i64::MIN)))
}

#[async_trait]
impl MetricFetcher for UtilizationFetcher {
    fn section(&self) -> SectionName {
        SectionName::Utilization
    }

    async fn fetch(
        &self,
        target: &ResourceHandle,
        window: &StatisticsWindow,
    ) -> Result<SectionPayload, FetchError> {
        let cluster = target.service_cluster().ok_or_else(|| {
            FetchError::InvalidTarget(format!(
                "service ARN '{}' carries no cluster segment",
                target.id
            ))
        })?;
        let service = &target.display_name;

        let (cpu, cpu_series) = self
            .statistic(cluster, service, "CPUUtilization", window)
            .await?;
        let (memory, memory_series) = self
            .statistic(cluster, service, "MemoryUtilization", window)
            .await?;

        Ok(SectionPayload::Utilization(UtilizationSummary::new(
            cpu,
            memory,
            vec![cpu_series, memory_series],
        )))
    }
}
