//! Inventory snapshots
//!
//! One snapshot per `(kind, scope)` pair. Snapshots are never mutated
//! after creation; a refresh produces a new snapshot object that replaces
//! the old one wholesale, so readers never observe a half-written
//! listing.

use super::handle::ResourceHandle;
use super::kind::ResourceKind;
use super::scope::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable listing of every known resource of one kind in one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub entries: Vec<ResourceHandle>,
    pub fetched_at: DateTime<Utc>,
}

impl InventorySnapshot {
    pub fn new(kind: ResourceKind, scope: Scope, entries: Vec<ResourceHandle>) -> Self {
        Self {
            kind,
            scope,
            entries,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
