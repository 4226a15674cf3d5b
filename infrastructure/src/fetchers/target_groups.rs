//! Target group discovery
//!
//! The ALB-facing fetchers accept either a service target (target groups
//! derived from the service definition) or a target group named
//! directly. Either way they need the group's ARN plus the CloudWatch
//! dimensions of the group and its load balancer.

use super::{lb_dimension, tg_dimension};
use crate::aws::clients::AwsClients;
use crate::aws::retry::{describe_error, retry_throttled};
use ecscope_application::ports::metric_fetcher::FetchError;
use ecscope_domain::{ResourceHandle, ResourceKind};

/// One target group ready for metric queries.
#[derive(Debug, Clone)]
pub(crate) struct TargetGroupRef {
    pub group: ResourceHandle,
    pub load_balancer: ResourceHandle,
    /// `LoadBalancer` dimension value (`app/name/id`)
    pub lb_dimension: String,
    /// `TargetGroup` dimension value (`targetgroup/name/id`)
    pub tg_dimension: String,
}

/// Resolve the target groups behind `target`.
///
/// A service with no load balancer yields [`FetchError::NoLoadBalancer`];
/// the target-health fetcher treats that as an empty (healthy) listing,
/// the ALB metric fetchers surface it.
pub(crate) async fn resolve_target_groups(
    clients: &AwsClients,
    source_id: &'static str,
    target: &ResourceHandle,
) -> Result<Vec<TargetGroupRef>, FetchError> {
    match target.kind {
        ResourceKind::TargetGroup => {
            let group = describe_one_group(clients, source_id, target).await?;
            Ok(vec![group])
        }
        ResourceKind::Service => service_target_groups(clients, source_id, target).await,
        other => Err(FetchError::InvalidTarget(format!(
            "cannot derive target groups from a {other} target"
        ))),
    }
}

async fn describe_one_group(
    clients: &AwsClients,
    source_id: &'static str,
    target: &ResourceHandle,
) -> Result<TargetGroupRef, FetchError> {
    let builder = || {
        let call = clients.elbv2.describe_target_groups();
        if target.id.starts_with("arn:") {
            call.target_group_arns(target.id.clone())
        } else {
            call.names(target.display_name.clone())
        }
    };
    let described = retry_throttled(|| builder().send())
        .await
        .map_err(|e| FetchError::upstream(source_id, describe_error(e)))?;

    let group = described
        .target_groups()
        .first()
        .ok_or_else(|| {
            FetchError::InvalidTarget(format!("target group '{}' not found", target.display_name))
        })?;
    group_ref(source_id, group)
}

async fn service_target_groups(
    clients: &AwsClients,
    source_id: &'static str,
    target: &ResourceHandle,
) -> Result<Vec<TargetGroupRef>, FetchError> {
    let cluster = target.service_cluster().ok_or_else(|| {
        FetchError::InvalidTarget(format!(
            "service ARN '{}' carries no cluster segment",
            target.id
        ))
    })?;

    let described = retry_throttled(|| {
        clients
            .ecs
            .describe_services()
            .cluster(cluster)
            .services(target.display_name.clone())
            .send()
    })
    .await
    .map_err(|e| FetchError::upstream(source_id, describe_error(e)))?;

    let service = described.services().first().ok_or_else(|| {
        FetchError::InvalidTarget(format!(
            "service '{}' not found in cluster '{}'",
            target.display_name, cluster
        ))
    })?;

    let group_arns: Vec<String> = service
        .load_balancers()
        .iter()
        .filter_map(|lb| lb.target_group_arn().map(str::to_string))
        .collect();
    if group_arns.is_empty() {
        return Err(FetchError::NoLoadBalancer);
    }

    let mut refs = Vec::with_capacity(group_arns.len());
    for arn in group_arns {
        let described = retry_throttled(|| {
            clients
                .elbv2
                .describe_target_groups()
                .target_group_arns(arn.clone())
                .send()
        })
        .await
        .map_err(|e| FetchError::upstream(source_id, describe_error(e)))?;
        if let Some(group) = described.target_groups().first() {
            refs.push(group_ref(source_id, group)?);
        }
    }
    if refs.is_empty() {
        return Err(FetchError::NoLoadBalancer);
    }
    Ok(refs)
}

fn group_ref(
    source_id: &'static str,
    group: &aws_sdk_elasticloadbalancingv2::types::TargetGroup,
) -> Result<TargetGroupRef, FetchError> {
    let arn = group
        .target_group_arn()
        .ok_or_else(|| FetchError::upstream(source_id, "target group without ARN"))?;
    let name = group
        .target_group_name()
        .unwrap_or_else(|| tg_dimension(arn));
    let lb_arn = group
        .load_balancer_arns()
        .first()
        .ok_or(FetchError::NoLoadBalancer)?;
    let lb_dim = lb_dimension(lb_arn).ok_or_else(|| {
        FetchError::upstream(source_id, format!("unparseable load balancer ARN '{lb_arn}'"))
    })?;

    Ok(TargetGroupRef {
        group: ResourceHandle::new(ResourceKind::TargetGroup, arn, name),
        load_balancer: ResourceHandle::new(ResourceKind::LoadBalancer, lb_arn, lb_dim),
        lb_dimension: lb_dim.to_string(),
        tg_dimension: tg_dimension(arn).to_string(),
    })
}
