//! Tool facade
//!
//! The only component visible at the external protocol boundary. Each
//! operation resolves its free-text identifiers, drives the aggregator
//! with the sections relevant to that operation, and shapes the result.
//! When resolution is ambiguous the facade never silently picks the top
//! candidate; the candidates go back to the caller.

pub mod reply;

pub use reply::{CandidateView, Disambiguation, ReplyStatus, ToolReply};

use crate::aggregator::Aggregator;
use crate::inventory::InventoryCache;
use crate::ports::inventory_source::InventorySource;
use crate::resolver::NameResolver;
use chrono::Utc;
use ecscope_domain::{
    ResolutionResult, ResourceHandle, ResourceKind, Scope, SectionName, ServiceListing,
    StatisticsWindow, ToolDefinition, ToolParameter, validate_arguments,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const CHECK_SERVICE_STATUS: &str = "check_service_status";
pub const GET_SERVICE_METRICS: &str = "get_service_metrics";
pub const GET_TARGET_GROUP_RESPONSE_TIME: &str = "get_target_group_response_time";
pub const GET_TARGET_GROUP_REQUEST_METRICS: &str = "get_target_group_request_metrics";
pub const LIST_SERVICES: &str = "list_services";

/// Definitions of every externally exposed operation.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let service = ToolParameter::new("service_name", "Service name, may be partial or fuzzy", true);
    let period = ToolParameter::new(
        "period_minutes",
        "Metric window in minutes (default from configuration)",
        false,
    )
    .with_type("number");
    let target_group = ToolParameter::new(
        "target_group",
        "Target group name or ARN; overrides derivation from the service",
        false,
    );

    vec![
        ToolDefinition::new(
            CHECK_SERVICE_STATUS,
            "Check service health: task counts, deployment rollout, container images, and target health",
        )
        .with_parameter(service.clone()),
        ToolDefinition::new(
            GET_SERVICE_METRICS,
            "CPU and memory utilization for a service with min/max/avg and a health band",
        )
        .with_parameter(service.clone())
        .with_parameter(period.clone()),
        ToolDefinition::new(
            GET_TARGET_GROUP_RESPONSE_TIME,
            "Response-time summary (latest, extremes, p50/p90/p99) for a service's target group",
        )
        .with_parameter(service.clone())
        .with_parameter(period.clone())
        .with_parameter(target_group.clone()),
        ToolDefinition::new(
            GET_TARGET_GROUP_REQUEST_METRICS,
            "Request count and HTTP status-code breakdown for a service's target groups",
        )
        .with_parameter(service)
        .with_parameter(period)
        .with_parameter(target_group),
        ToolDefinition::new(LIST_SERVICES, "List all services in a cluster")
            .with_parameter(ToolParameter::new(
                "cluster_name",
                "Cluster name, may be partial or fuzzy",
                true,
            )),
    ]
}

/// Maps tool operations onto the resolution + aggregation pipeline.
pub struct ToolFacade<S> {
    resolver: NameResolver<S>,
    inventory: Arc<InventoryCache<S>>,
    aggregator: Aggregator,
    definitions: Vec<ToolDefinition>,
    default_window_minutes: i64,
    period_seconds: u32,
}

impl<S: InventorySource> ToolFacade<S> {
    pub fn new(
        resolver: NameResolver<S>,
        inventory: Arc<InventoryCache<S>>,
        aggregator: Aggregator,
        default_window_minutes: i64,
        period_seconds: u32,
    ) -> Self {
        Self {
            resolver,
            inventory,
            aggregator,
            definitions: tool_definitions(),
            default_window_minutes,
            period_seconds,
        }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Validate and route one tool call by name.
    pub async fn dispatch(&self, tool: &str, args: &Value) -> ToolReply {
        let Some(definition) = self.definitions.iter().find(|d| d.name == tool) else {
            return ToolReply::error(format!("unknown tool '{tool}'"));
        };
        if let Err(message) = validate_arguments(definition, args) {
            return ToolReply::error(message);
        }

        info!(tool, "dispatching tool call");
        match tool {
            CHECK_SERVICE_STATUS => {
                self.check_service_status(required_str(args, "service_name")).await
            }
            GET_SERVICE_METRICS => {
                self.service_metrics(required_str(args, "service_name"), minutes_arg(args))
                    .await
            }
            GET_TARGET_GROUP_RESPONSE_TIME => {
                self.target_group_response_time(
                    required_str(args, "service_name"),
                    minutes_arg(args),
                    optional_str(args, "target_group"),
                )
                .await
            }
            GET_TARGET_GROUP_REQUEST_METRICS => {
                self.target_group_request_metrics(
                    required_str(args, "service_name"),
                    minutes_arg(args),
                    optional_str(args, "target_group"),
                )
                .await
            }
            LIST_SERVICES => self.list_services(required_str(args, "cluster_name")).await,
            _ => ToolReply::error(format!("unknown tool '{tool}'")),
        }
    }

    /// Service status: task counts, rollout, and target health.
    pub async fn check_service_status(&self, service_name: &str) -> ToolReply {
        let target = match self.resolve_service(service_name).await {
            Ok(handle) => handle,
            Err(reply) => return reply,
        };
        let window = self.window(None);
        let report = self
            .aggregator
            .aggregate(
                &target,
                &[SectionName::Deployment, SectionName::TargetHealth],
                &window,
            )
            .await;
        ToolReply::report(report)
    }

    /// CPU and memory utilization for a service.
    pub async fn service_metrics(
        &self,
        service_name: &str,
        period_minutes: Option<i64>,
    ) -> ToolReply {
        let target = match self.resolve_service(service_name).await {
            Ok(handle) => handle,
            Err(reply) => return reply,
        };
        let window = self.window(period_minutes);
        let report = self
            .aggregator
            .aggregate(&target, &[SectionName::Utilization], &window)
            .await;
        ToolReply::report(report)
    }

    /// Response-time summary for a service's target group (or an
    /// explicitly named target group).
    pub async fn target_group_response_time(
        &self,
        service_name: &str,
        period_minutes: Option<i64>,
        target_group: Option<&str>,
    ) -> ToolReply {
        let target = match self.resolve_metric_target(service_name, target_group).await {
            Ok(handle) => handle,
            Err(reply) => return reply,
        };
        let window = self.window(period_minutes);
        let report = self
            .aggregator
            .aggregate(&target, &[SectionName::ResponseTime], &window)
            .await;
        ToolReply::report(report)
    }

    /// Request volume and status codes for a service's target groups.
    pub async fn target_group_request_metrics(
        &self,
        service_name: &str,
        period_minutes: Option<i64>,
        target_group: Option<&str>,
    ) -> ToolReply {
        let target = match self.resolve_metric_target(service_name, target_group).await {
            Ok(handle) => handle,
            Err(reply) => return reply,
        };
        let window = self.window(period_minutes);
        let report = self
            .aggregator
            .aggregate(&target, &[SectionName::Requests], &window)
            .await;
        ToolReply::report(report)
    }

    /// Services of one cluster, from the cached inventory.
    pub async fn list_services(&self, cluster_name: &str) -> ToolReply {
        let cluster = match self
            .resolve_one(cluster_name, ResourceKind::Cluster, &Scope::Region)
            .await
        {
            Ok(handle) => handle,
            Err(reply) => return reply,
        };

        let scope = Scope::cluster(cluster.display_name.clone());
        match self.inventory.list(ResourceKind::Service, &scope).await {
            Ok(snapshot) => {
                let services = snapshot
                    .entries
                    .iter()
                    .map(|h| h.display_name.clone())
                    .collect();
                ToolReply::listing(ServiceListing::new(cluster, services))
            }
            Err(e) => ToolReply::error(e.to_string()),
        }
    }

    fn window(&self, period_minutes: Option<i64>) -> StatisticsWindow {
        let minutes = period_minutes
            .filter(|m| *m > 0)
            .unwrap_or(self.default_window_minutes);
        StatisticsWindow::last_minutes(Utc::now(), minutes, self.period_seconds)
    }

    async fn resolve_service(&self, service_name: &str) -> Result<ResourceHandle, ToolReply> {
        match self.resolver.resolve_service(service_name).await {
            Ok(ResolutionResult::Resolved(c)) => Ok(c.handle),
            Ok(ResolutionResult::Ambiguous(candidates)) => Err(ToolReply::ambiguous(
                ResourceKind::Service,
                service_name,
                &candidates,
            )),
            Ok(ResolutionResult::NotFound) => {
                Err(ToolReply::not_found(ResourceKind::Service, service_name))
            }
            Err(e) => Err(ToolReply::error(e.to_string())),
        }
    }

    async fn resolve_one(
        &self,
        text: &str,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<ResourceHandle, ToolReply> {
        match self.resolver.resolve(text, kind, scope).await {
            Ok(ResolutionResult::Resolved(c)) => Ok(c.handle),
            Ok(ResolutionResult::Ambiguous(candidates)) => {
                Err(ToolReply::ambiguous(kind, text, &candidates))
            }
            Ok(ResolutionResult::NotFound) => Err(ToolReply::not_found(kind, text)),
            Err(e) => Err(ToolReply::error(e.to_string())),
        }
    }

    /// An explicit target group name wins over derivation from the
    /// service.
    async fn resolve_metric_target(
        &self,
        service_name: &str,
        target_group: Option<&str>,
    ) -> Result<ResourceHandle, ToolReply> {
        match target_group {
            Some(name) => {
                self.resolve_one(name, ResourceKind::TargetGroup, &Scope::Region)
                    .await
            }
            None => self.resolve_service(service_name).await,
        }
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn minutes_arg(args: &Value) -> Option<i64> {
    let value = args.get("period_minutes")?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatorConfig;
    use crate::ports::inventory_source::{InventoryError, InventorySource};
    use crate::ports::metric_fetcher::{FetchError, MetricFetcher};
    use async_trait::async_trait;
    use ecscope_domain::{DeploymentSummary, SectionPayload};
    use serde_json::json;
    use std::time::Duration;

    struct FleetSource;

    #[async_trait]
    impl InventorySource for FleetSource {
        async fn list(
            &self,
            kind: ResourceKind,
            scope: &Scope,
        ) -> Result<Vec<ResourceHandle>, InventoryError> {
            let names: Vec<&str> = match (kind, scope) {
                (ResourceKind::Cluster, Scope::Region) => vec!["prod", "staging"],
                (ResourceKind::Service, _) => vec!["web-api", "web-api2", "checkout"],
                (ResourceKind::TargetGroup, Scope::Region) => vec!["web-api-tg"],
                _ => vec![],
            };
            Ok(names
                .into_iter()
                .map(|n| ResourceHandle::new(kind, n, n))
                .collect())
        }
    }

    struct HealthyDeploymentFetcher;

    #[async_trait]
    impl MetricFetcher for HealthyDeploymentFetcher {
        fn section(&self) -> SectionName {
            SectionName::Deployment
        }

        async fn fetch(
            &self,
            _target: &ResourceHandle,
            _window: &StatisticsWindow,
        ) -> Result<SectionPayload, FetchError> {
            Ok(SectionPayload::Deployment(DeploymentSummary {
                running_count: 2,
                desired_count: 2,
                pending_count: 0,
                rollout: None,
                containers: vec![],
                unhealthy_tasks: vec![],
            }))
        }
    }

    fn facade() -> ToolFacade<FleetSource> {
        let inventory = Arc::new(InventoryCache::new(FleetSource, Duration::from_secs(60)));
        let resolver = NameResolver::new(
            Arc::clone(&inventory),
            ecscope_domain::ResolverThresholds::default(),
        );
        let aggregator = Aggregator::new(AggregatorConfig::default())
            .register(Arc::new(HealthyDeploymentFetcher));
        ToolFacade::new(resolver, inventory, aggregator, 15, 300)
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_is_an_error() {
        let reply = facade().dispatch("restart_service", &json!({})).await;
        assert_eq!(reply.status, ReplyStatus::Error);
        assert!(reply.error.unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn dispatch_missing_required_parameter_is_an_error() {
        let reply = facade().dispatch(CHECK_SERVICE_STATUS, &json!({})).await;
        assert_eq!(reply.status, ReplyStatus::Error);
        assert!(reply.error.unwrap().contains("service_name"));
    }

    #[tokio::test]
    async fn status_check_returns_report_with_requested_sections() {
        let reply = facade()
            .dispatch(CHECK_SERVICE_STATUS, &json!({"service_name": "web-api"}))
            .await;
        assert!(reply.is_ok());
        let report = reply.report.unwrap();
        assert!(report.section(SectionName::Deployment).is_some());
        // No target-health fetcher registered in this fixture: the
        // section must still be present, as unavailable.
        assert!(report.section(SectionName::TargetHealth).is_some());
    }

    #[tokio::test]
    async fn ambiguous_service_name_surfaces_candidates() {
        // "web-ap" is a prefix of both web-api and web-api2, within the
        // tie margin
        let reply = facade()
            .dispatch(CHECK_SERVICE_STATUS, &json!({"service_name": "web-ap"}))
            .await;
        assert_eq!(reply.status, ReplyStatus::Ambiguous);
        let d = reply.disambiguation.unwrap();
        assert!(d.candidates.len() >= 2);
        assert!(d.candidates[0].score >= d.candidates[1].score);
        assert!(reply.report.is_none());
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let reply = facade()
            .dispatch(CHECK_SERVICE_STATUS, &json!({"service_name": "zzzzqqq"}))
            .await;
        assert_eq!(reply.status, ReplyStatus::NotFound);
    }

    #[tokio::test]
    async fn list_services_resolves_fuzzy_cluster_name() {
        let reply = facade()
            .dispatch(LIST_SERVICES, &json!({"cluster_name": "prod"}))
            .await;
        assert!(reply.is_ok());
        let listing = reply.listing.unwrap();
        assert_eq!(listing.cluster.display_name, "prod");
        assert_eq!(listing.service_count, 3);
    }

    #[tokio::test]
    async fn period_minutes_accepts_number_or_string() {
        assert_eq!(minutes_arg(&json!({"period_minutes": 30})), Some(30));
        assert_eq!(minutes_arg(&json!({"period_minutes": "30"})), Some(30));
        assert_eq!(minutes_arg(&json!({})), None);
    }

    #[tokio::test]
    async fn explicit_target_group_is_resolved_directly() {
        let reply = facade()
            .dispatch(
                GET_TARGET_GROUP_REQUEST_METRICS,
                &json!({"service_name": "web-api", "target_group": "web-api-tg"}),
            )
            .await;
        // Requests fetcher is not registered in this fixture; the
        // resolution itself must still succeed and yield a report.
        assert!(reply.is_ok());
        let report = reply.report.unwrap();
        assert_eq!(report.target.kind, ResourceKind::TargetGroup);
    }

    #[test]
    fn definitions_cover_all_five_tools() {
        let names: Vec<_> = tool_definitions().iter().map(|d| d.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                CHECK_SERVICE_STATUS,
                GET_SERVICE_METRICS,
                GET_TARGET_GROUP_RESPONSE_TIME,
                GET_TARGET_GROUP_REQUEST_METRICS,
                LIST_SERVICES,
            ]
        );
    }
}
