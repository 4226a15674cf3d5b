//! Inventory source port
//!
//! Defines the interface to the upstream list/describe operations. The
//! TTL and single-flight discipline live in
//! [`crate::inventory::InventoryCache`], not here.

use async_trait::async_trait;
use ecscope_domain::{ResourceHandle, ResourceKind, Scope};
use thiserror::Error;

/// An upstream list/describe call failed. Stale cache is never
/// substituted for this; the caller decides whether to tolerate
/// staleness.
#[derive(Error, Debug, Clone)]
#[error("inventory of {kind} in {scope} unavailable: {cause}")]
pub struct InventoryError {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub cause: String,
}

impl InventoryError {
    pub fn new(kind: ResourceKind, scope: Scope, cause: impl Into<String>) -> Self {
        Self {
            kind,
            scope,
            cause: cause.into(),
        }
    }
}

/// Read-only access to the cloud resource inventory.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// List every resource of `kind` within `scope`.
    ///
    /// Supported combinations: clusters in region, services per cluster,
    /// services region-wide, target groups in region.
    async fn list(
        &self,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<Vec<ResourceHandle>, InventoryError>;
}
