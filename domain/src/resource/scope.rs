//! Listing scope

use serde::{Deserialize, Serialize};

/// Scope of an inventory listing. Part of every cache key: services are
/// listed per cluster or fleet-wide, clusters and target groups per
/// region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "name")]
pub enum Scope {
    /// The whole region the client is configured for
    Region,
    /// A single cluster, by name or ARN
    Cluster(String),
}

impl Scope {
    pub fn cluster(name: impl Into<String>) -> Self {
        Scope::Cluster(name.into())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Region => write!(f, "region"),
            Scope::Cluster(name) => write!(f, "cluster {}", name),
        }
    }
}
