//! ECS inventory source
//!
//! Implements [`InventorySource`] over the ECS control plane and ELBv2.
//! All list calls paginate; region-wide service listing expands the
//! cluster list in parallel so one cache entry covers the whole fleet.

use super::clients::AwsClients;
use super::retry::{describe_error, retry_throttled};
use async_trait::async_trait;
use ecscope_application::ports::inventory_source::{InventoryError, InventorySource};
use ecscope_domain::{ResourceHandle, ResourceKind, Scope};
use futures::future::try_join_all;
use tracing::debug;

pub struct EcsInventorySource {
    clients: AwsClients,
}

impl EcsInventorySource {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    async fn list_clusters(&self, scope: &Scope) -> Result<Vec<ResourceHandle>, InventoryError> {
        let mut arns: Vec<String> = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = retry_throttled(|| {
                self.clients
                    .ecs
                    .list_clusters()
                    .set_next_token(next_token.clone())
                    .send()
            })
            .await
            .map_err(|e| {
                InventoryError::new(ResourceKind::Cluster, scope.clone(), describe_error(e))
            })?;

            arns.extend(page.cluster_arns().iter().cloned());
            next_token = page.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }
        debug!(count = arns.len(), "listed clusters");
        Ok(arns
            .into_iter()
            .map(|arn| ResourceHandle::from_arn(ResourceKind::Cluster, arn))
            .collect())
    }

    async fn list_services_in_cluster(
        &self,
        cluster: &str,
        scope: &Scope,
    ) -> Result<Vec<ResourceHandle>, InventoryError> {
        let mut arns: Vec<String> = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = retry_throttled(|| {
                self.clients
                    .ecs
                    .list_services()
                    .cluster(cluster)
                    .set_next_token(next_token.clone())
                    .send()
            })
            .await
            .map_err(|e| {
                InventoryError::new(ResourceKind::Service, scope.clone(), describe_error(e))
            })?;

            arns.extend(page.service_arns().iter().cloned());
            next_token = page.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }
        Ok(arns
            .into_iter()
            .map(|arn| ResourceHandle::from_arn(ResourceKind::Service, arn))
            .collect())
    }

    /// Services of every cluster in the region, expanded in parallel.
    async fn list_services_region_wide(
        &self,
        scope: &Scope,
    ) -> Result<Vec<ResourceHandle>, InventoryError> {
        let clusters = self.list_clusters(scope).await?;
        let listings = try_join_all(
            clusters
                .iter()
                .map(|cluster| self.list_services_in_cluster(&cluster.display_name, scope)),
        )
        .await?;
        Ok(listings.into_iter().flatten().collect())
    }

    async fn list_target_groups(
        &self,
        scope: &Scope,
    ) -> Result<Vec<ResourceHandle>, InventoryError> {
        let mut handles: Vec<ResourceHandle> = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let page = retry_throttled(|| {
                self.clients
                    .elbv2
                    .describe_target_groups()
                    .set_marker(marker.clone())
                    .send()
            })
            .await
            .map_err(|e| {
                InventoryError::new(ResourceKind::TargetGroup, scope.clone(), describe_error(e))
            })?;

            for group in page.target_groups() {
                if let (Some(arn), Some(name)) =
                    (group.target_group_arn(), group.target_group_name())
                {
                    handles.push(ResourceHandle::new(ResourceKind::TargetGroup, arn, name));
                }
            }
            marker = page.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
        Ok(handles)
    }
}

#[async_trait]
impl InventorySource for EcsInventorySource {
    async fn list(
        &self,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<Vec<ResourceHandle>, InventoryError> {
        match (kind, scope) {
            (ResourceKind::Cluster, Scope::Region) => self.list_clusters(scope).await,
            (ResourceKind::Service, Scope::Cluster(cluster)) => {
                self.list_services_in_cluster(cluster, scope).await
            }
            (ResourceKind::Service, Scope::Region) => self.list_services_region_wide(scope).await,
            (ResourceKind::TargetGroup, Scope::Region) => self.list_target_groups(scope).await,
            _ => Err(InventoryError::new(
                kind,
                scope.clone(),
                "listing is not supported for this kind/scope combination",
            )),
        }
    }
}
