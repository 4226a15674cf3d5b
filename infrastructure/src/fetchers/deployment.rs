//! Task and deployment state fetcher
//!
//! Reads running/desired counts and the PRIMARY deployment's rollout
//! state from `DescribeServices`, the active container images from
//! `DescribeTaskDefinition` (registry account masked), and — when the
//! counts or rollout look unhealthy — drills into the running tasks to
//! report containers outside RUNNING state.

use super::mask_registry;
use crate::aws::clients::AwsClients;
use crate::aws::retry::{describe_error, retry_throttled};
use async_trait::async_trait;
use aws_sdk_ecs::types::DesiredStatus;
use ecscope_application::ports::metric_fetcher::{FetchError, MetricFetcher};
use ecscope_domain::{
    ContainerImage, ContainerProblem, DeploymentSummary, ResourceHandle, ResourceKind,
    RolloutInfo, SectionName, SectionPayload, StatisticsWindow, TaskProblem,
};
use tracing::debug;

const SOURCE: &str = "ecs/deployment";

pub struct DeploymentFetcher {
    clients: AwsClients,
}

impl DeploymentFetcher {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    async fn container_images(
        &self,
        task_definition: &str,
    ) -> Result<Vec<ContainerImage>, FetchError> {
        let described = retry_throttled(|| {
            self.clients
                .ecs
                .describe_task_definition()
                .task_definition(task_definition)
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let Some(definition) = described.task_definition() else {
            return Ok(Vec::new());
        };
        Ok(definition
            .container_definitions()
            .iter()
            .map(|c| ContainerImage {
                name: c.name().unwrap_or("unknown").to_string(),
                image: c.image().map(mask_registry).unwrap_or_else(|| "unknown".to_string()),
            })
            .collect())
    }

    async fn unhealthy_tasks(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Vec<TaskProblem>, FetchError> {
        let listed = retry_throttled(|| {
            self.clients
                .ecs
                .list_tasks()
                .cluster(cluster)
                .service_name(service)
                .desired_status(DesiredStatus::Running)
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let arns = listed.task_arns();
        if arns.is_empty() {
            return Ok(Vec::new());
        }

        let described = retry_throttled(|| {
            self.clients
                .ecs
                .describe_tasks()
                .cluster(cluster)
                .set_tasks(Some(arns.to_vec()))
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        let mut problems = Vec::new();
        for task in described.tasks() {
            let bad_containers: Vec<ContainerProblem> = task
                .containers()
                .iter()
                .filter(|c| c.last_status() != Some("RUNNING"))
                .map(|c| ContainerProblem {
                    name: c.name().unwrap_or("unknown").to_string(),
                    status: c.last_status().unwrap_or("UNKNOWN").to_string(),
                    reason: c.reason().map(str::to_string),
                })
                .collect();
            if bad_containers.is_empty() {
                continue;
            }
            let arn = task.task_arn().unwrap_or("unknown");
            problems.push(TaskProblem {
                task: ResourceHandle::from_arn(ResourceKind::Task, arn),
                status: task.last_status().unwrap_or("UNKNOWN").to_string(),
                containers: bad_containers,
            });
        }
        Ok(problems)
    }
}

#[async_trait]
impl MetricFetcher for DeploymentFetcher {
    fn section(&self) -> SectionName {
        SectionName::Deployment
    }

    async fn fetch(
        &self,
        target: &ResourceHandle,
        _window: &StatisticsWindow,
    ) -> Result<SectionPayload, FetchError> {
        let cluster = target.service_cluster().ok_or_else(|| {
            FetchError::InvalidTarget(format!(
                "service ARN '{}' carries no cluster segment",
                target.id
            ))
        })?;
        let service_name = target.display_name.clone();

        let described = retry_throttled(|| {
            self.clients
                .ecs
                .describe_services()
                .cluster(cluster)
                .services(service_name.clone())
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(SOURCE, describe_error(e)))?;

        if let Some(failure) = described.failures().first() {
            return Err(FetchError::upstream(
                SOURCE,
                failure.reason().unwrap_or("unspecified describe failure"),
            ));
        }
        let service = described.services().first().ok_or_else(|| {
            FetchError::InvalidTarget(format!(
                "service '{service_name}' not found in cluster '{cluster}'"
            ))
        })?;

        let primary = service
            .deployments()
            .iter()
            .find(|d| d.status() == Some("PRIMARY"));
        let rollout = primary.map(|d| RolloutInfo {
            state: d
                .rollout_state()
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            running: d.running_count(),
            pending: d.pending_count(),
            failed: d.failed_tasks(),
            task_definition: d
                .task_definition()
                .map(|arn| arn.rsplit('/').next().unwrap_or(arn).to_string()),
        });

        let containers = match primary.and_then(|d| d.task_definition()) {
            Some(task_definition) => self.container_images(task_definition).await?,
            None => Vec::new(),
        };

        let running_count = service.running_count();
        let desired_count = service.desired_count();
        let looks_unhealthy = running_count != desired_count
            || rollout.as_ref().map(RolloutInfo::is_failed).unwrap_or(false);
        let unhealthy_tasks = if looks_unhealthy {
            debug!(service = %service_name, "counts off; drilling into tasks");
            self.unhealthy_tasks(cluster, &service_name).await?
        } else {
            Vec::new()
        };

        Ok(SectionPayload::Deployment(DeploymentSummary {
            running_count,
            desired_count,
            pending_count: service.pending_count(),
            rollout,
            containers,
            unhealthy_tasks,
        }))
    }
}
