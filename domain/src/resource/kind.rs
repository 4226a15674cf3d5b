//! Resource kind enumeration

use serde::{Deserialize, Serialize};

/// Kind of cloud resource a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A named grouping of compute capacity hosting services
    Cluster,
    /// A managed set of identical tasks within a cluster
    Service,
    /// A running instance of a container workload
    Task,
    /// A set of network endpoints tracked by a load balancer
    TargetGroup,
    /// The load balancer fronting one or more target groups
    LoadBalancer,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::Service => "service",
            ResourceKind::Task => "task",
            ResourceKind::TargetGroup => "target_group",
            ResourceKind::LoadBalancer => "load_balancer",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ResourceKind::Cluster.to_string(), "cluster");
        assert_eq!(ResourceKind::TargetGroup.to_string(), "target_group");
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ResourceKind::LoadBalancer).unwrap();
        assert_eq!(json, "\"load_balancer\"");
    }
}
