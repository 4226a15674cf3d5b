//! Metric aggregator
//!
//! Fans out all requested fetchers concurrently against one resolved
//! target and merges the outcomes into a single report. The report
//! always returns: a failed or timed-out fetch marks its own section
//! `Unavailable` and nothing else. A shared semaphore caps concurrent
//! upstream calls so a burst of tool calls queues instead of hammering
//! the monitoring API.

use crate::ports::metric_fetcher::MetricFetcher;
use ecscope_domain::{
    AggregatedReport, ReportSection, ResourceHandle, SectionName, StatisticsWindow,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

/// Knobs for one aggregator instance.
#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    /// Deadline for the whole aggregate call
    pub timeout: Duration,
    /// Ceiling on concurrently running fetches
    pub max_concurrent_fetches: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_concurrent_fetches: 4,
        }
    }
}

/// Concurrent fan-out over registered [`MetricFetcher`]s.
pub struct Aggregator {
    fetchers: HashMap<SectionName, Arc<dyn MetricFetcher>>,
    limiter: Arc<Semaphore>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            fetchers: HashMap::new(),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            timeout: config.timeout,
        }
    }

    pub fn register(mut self, fetcher: Arc<dyn MetricFetcher>) -> Self {
        self.fetchers.insert(fetcher.section(), fetcher);
        self
    }

    /// Fetch all requested sections for one target and merge the results.
    ///
    /// Never fails: every requested section appears in the report, as
    /// `Unavailable` when its fetch errored, timed out, or has no
    /// registered fetcher.
    pub async fn aggregate(
        &self,
        target: &ResourceHandle,
        sections: &[SectionName],
        window: &StatisticsWindow,
    ) -> AggregatedReport {
        let mut report = AggregatedReport::new(target.clone(), *window);
        let mut join_set = JoinSet::new();
        let mut requested: Vec<SectionName> = Vec::new();

        for &name in sections {
            if requested.contains(&name) {
                continue;
            }
            requested.push(name);

            let Some(fetcher) = self.fetchers.get(&name) else {
                warn!(section = %name, "no fetcher registered");
                report.insert(
                    name,
                    ReportSection::unavailable(format!("no fetcher registered for {name}")),
                );
                continue;
            };

            let fetcher = Arc::clone(fetcher);
            let limiter = Arc::clone(&self.limiter);
            let target = target.clone();
            let window = *window;
            join_set.spawn(async move {
                let _permit = limiter.acquire_owned().await;
                let outcome = fetcher.fetch(&target, &window).await;
                (name, outcome)
            });
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            match timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(Ok((name, Ok(payload))))) => {
                    debug!(section = %name, "section fetched");
                    report.insert(name, ReportSection::from_payload(payload));
                }
                Ok(Some(Ok((name, Err(e))))) => {
                    warn!(section = %name, error = %e, "section fetch failed");
                    report.insert(name, ReportSection::unavailable(e.to_string()));
                }
                Ok(Some(Err(join_error))) => {
                    warn!(error = %join_error, "fetch task aborted");
                }
                Ok(None) => break,
                Err(_elapsed) => {
                    join_set.abort_all();
                    break;
                }
            }
        }

        // Every requested section must appear, even when its task was
        // abandoned at the deadline.
        for name in requested {
            if report.section(name).is_none() {
                report.insert(
                    name,
                    ReportSection::unavailable(format!(
                        "timed out after {}s",
                        self.timeout.as_secs()
                    )),
                );
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::metric_fetcher::FetchError;
    use async_trait::async_trait;
    use ecscope_domain::{
        DeploymentSummary, RequestSummary, ResourceKind, SectionPayload, SectionStatus,
        TargetHealthSummary, UtilizationSummary,
    };
    use chrono::{TimeZone, Utc};

    fn target() -> ResourceHandle {
        ResourceHandle::new(
            ResourceKind::Service,
            "arn:aws:ecs:us-east-1:123456789012:service/prod/web",
            "web",
        )
    }

    fn window() -> StatisticsWindow {
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        StatisticsWindow::last_minutes(end, 15, 300)
    }

    fn deployment_payload(running: i32, desired: i32) -> SectionPayload {
        SectionPayload::Deployment(DeploymentSummary {
            running_count: running,
            desired_count: desired,
            pending_count: 0,
            rollout: None,
            containers: vec![],
            unhealthy_tasks: vec![],
        })
    }

    struct StubFetcher {
        name: SectionName,
        delay: Duration,
        outcome: Result<SectionPayload, FetchError>,
    }

    impl StubFetcher {
        fn ok(name: SectionName, payload: SectionPayload) -> Arc<Self> {
            Arc::new(Self { name, delay: Duration::ZERO, outcome: Ok(payload) })
        }

        fn failing(name: SectionName) -> Arc<Self> {
            Arc::new(Self {
                name,
                delay: Duration::ZERO,
                outcome: Err(FetchError::upstream("stub", "connection reset")),
            })
        }

        fn slow(name: SectionName, delay: Duration, payload: SectionPayload) -> Arc<Self> {
            Arc::new(Self { name, delay, outcome: Ok(payload) })
        }
    }

    #[async_trait]
    impl MetricFetcher for StubFetcher {
        fn section(&self) -> SectionName {
            self.name
        }

        async fn fetch(
            &self,
            _target: &ResourceHandle,
            _window: &StatisticsWindow,
        ) -> Result<SectionPayload, FetchError> {
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }
    }

    fn four_section_aggregator(failing: Option<SectionName>) -> Aggregator {
        let mut agg = Aggregator::new(AggregatorConfig::default());
        let payloads = [
            (SectionName::Deployment, deployment_payload(2, 2)),
            (
                SectionName::Utilization,
                SectionPayload::Utilization(UtilizationSummary::new(None, None, vec![])),
            ),
            (
                SectionName::TargetHealth,
                SectionPayload::TargetHealth(TargetHealthSummary { groups: vec![] }),
            ),
            (
                SectionName::Requests,
                SectionPayload::Requests(RequestSummary::from_groups(vec![])),
            ),
        ];
        for (name, payload) in payloads {
            if Some(name) == failing {
                agg = agg.register(StubFetcher::failing(name));
            } else {
                agg = agg.register(StubFetcher::ok(name, payload));
            }
        }
        agg
    }

    const FOUR: [SectionName; 4] = [
        SectionName::Deployment,
        SectionName::Utilization,
        SectionName::TargetHealth,
        SectionName::Requests,
    ];

    #[tokio::test]
    async fn one_failing_fetcher_leaves_other_sections_intact() {
        let agg = four_section_aggregator(Some(SectionName::Utilization));
        let report = agg.aggregate(&target(), &FOUR, &window()).await;

        assert_eq!(report.sections.len(), 4);
        assert_eq!(
            report.section(SectionName::Utilization).unwrap().status,
            SectionStatus::Unavailable
        );
        for name in [SectionName::Deployment, SectionName::TargetHealth, SectionName::Requests] {
            assert_eq!(report.section(name).unwrap().status, SectionStatus::Ok);
        }
    }

    #[tokio::test]
    async fn sections_keyed_in_stable_order() {
        let agg = four_section_aggregator(None);
        // Request in scrambled order; report order must follow SectionName
        let scrambled = [
            SectionName::Requests,
            SectionName::Deployment,
            SectionName::TargetHealth,
            SectionName::Utilization,
        ];
        let report = agg.aggregate(&target(), &scrambled, &window()).await;
        let keys: Vec<_> = report.sections.keys().copied().collect();
        assert_eq!(keys, FOUR.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetcher_times_out_into_unavailable_section() {
        let agg = Aggregator::new(AggregatorConfig {
            timeout: Duration::from_secs(2),
            max_concurrent_fetches: 4,
        })
        .register(StubFetcher::ok(SectionName::Deployment, deployment_payload(2, 2)))
        .register(StubFetcher::slow(
            SectionName::Utilization,
            Duration::from_secs(10),
            SectionPayload::Utilization(UtilizationSummary::new(None, None, vec![])),
        ));

        let started = Instant::now();
        let report = agg
            .aggregate(
                &target(),
                &[SectionName::Deployment, SectionName::Utilization],
                &window(),
            )
            .await;
        assert!(started.elapsed() < Duration::from_secs(3));

        assert_eq!(report.section(SectionName::Deployment).unwrap().status, SectionStatus::Ok);
        let timed_out = report.section(SectionName::Utilization).unwrap();
        assert_eq!(timed_out.status, SectionStatus::Unavailable);
        assert!(timed_out.reason.as_deref().unwrap_or("").contains("timed out"));
    }

    #[tokio::test]
    async fn degraded_section_carries_count_mismatch_reason() {
        let agg = Aggregator::new(AggregatorConfig::default())
            .register(StubFetcher::ok(SectionName::Deployment, deployment_payload(2, 5)));
        let report = agg.aggregate(&target(), &[SectionName::Deployment], &window()).await;

        let section = report.section(SectionName::Deployment).unwrap();
        assert_eq!(section.status, SectionStatus::Degraded);
        let reason = section.reason.as_deref().unwrap();
        assert!(reason.contains('2') && reason.contains('5'), "reason: {reason}");
    }

    #[tokio::test]
    async fn unregistered_section_reports_unavailable() {
        let agg = Aggregator::new(AggregatorConfig::default());
        let report = agg.aggregate(&target(), &[SectionName::Requests], &window()).await;
        let section = report.section(SectionName::Requests).unwrap();
        assert_eq!(section.status, SectionStatus::Unavailable);
    }

    #[tokio::test]
    async fn burst_queues_behind_concurrency_ceiling() {
        // 4 fetchers, ceiling of 1: all must still complete.
        let agg = {
            let mut agg = Aggregator::new(AggregatorConfig {
                timeout: Duration::from_secs(10),
                max_concurrent_fetches: 1,
            });
            for name in FOUR {
                agg = agg.register(StubFetcher::slow(
                    name,
                    Duration::from_millis(5),
                    deployment_payload(1, 1),
                ));
            }
            agg
        };
        let report = agg.aggregate(&target(), &FOUR, &window()).await;
        assert_eq!(report.sections.len(), 4);
        assert!(report.sections.values().all(|s| s.status == SectionStatus::Ok));
    }
}
