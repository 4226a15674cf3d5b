//! Inventory cache
//!
//! Process-scoped cache of inventory snapshots keyed by `(kind, scope)`,
//! with an explicit TTL and a single-flight refresh discipline: at most
//! one upstream call per key is in flight at a time. Concurrent callers
//! for the same key queue on the slot's lock and observe the snapshot
//! the first caller produced.
//!
//! Snapshots are replaced wholesale (`Arc` swap under the slot lock);
//! readers never see a half-updated listing. On upstream failure the
//! error propagates — stale data is never silently substituted.

use crate::ports::inventory_source::{InventoryError, InventorySource};
use ecscope_domain::{InventorySnapshot, ResourceKind, Scope};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Default)]
struct Slot {
    snapshot: Option<Arc<InventorySnapshot>>,
    fetched: Option<Instant>,
}

/// TTL'd, single-flight cache over an [`InventorySource`].
pub struct InventoryCache<S> {
    source: S,
    ttl: Duration,
    slots: std::sync::Mutex<HashMap<(ResourceKind, Scope), Arc<tokio::sync::Mutex<Slot>>>>,
}

impl<S: InventorySource> InventoryCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slots: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached snapshot if fresh, otherwise refresh it.
    pub async fn list(
        &self,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<Arc<InventorySnapshot>, InventoryError> {
        let slot = self.slot(kind, scope);
        let mut guard = slot.lock().await;

        if let (Some(snapshot), Some(fetched)) = (&guard.snapshot, guard.fetched)
            && fetched.elapsed() < self.ttl
        {
            debug!(%kind, %scope, "inventory cache hit");
            return Ok(Arc::clone(snapshot));
        }

        self.refill(kind, scope, &mut guard).await
    }

    /// Bypass the TTL and refresh the snapshot for one key.
    pub async fn refresh(
        &self,
        kind: ResourceKind,
        scope: &Scope,
    ) -> Result<Arc<InventorySnapshot>, InventoryError> {
        let slot = self.slot(kind, scope);
        let mut guard = slot.lock().await;
        self.refill(kind, scope, &mut guard).await
    }

    /// Drop the cached snapshot for one key.
    pub fn invalidate(&self, kind: ResourceKind, scope: &Scope) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.remove(&(kind, scope.clone()));
        }
    }

    fn slot(&self, kind: ResourceKind, scope: &Scope) -> Arc<tokio::sync::Mutex<Slot>> {
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            slots
                .entry((kind, scope.clone()))
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Slot::default()))),
        )
    }

    // Caller holds the slot lock across the upstream call: that lock is
    // the single-flight guarantee.
    async fn refill(
        &self,
        kind: ResourceKind,
        scope: &Scope,
        guard: &mut Slot,
    ) -> Result<Arc<InventorySnapshot>, InventoryError> {
        debug!(%kind, %scope, "refreshing inventory");
        let entries = self.source.list(kind, scope).await?;
        let snapshot = Arc::new(InventorySnapshot::new(kind, scope.clone(), entries));
        guard.snapshot = Some(Arc::clone(&snapshot));
        guard.fetched = Some(Instant::now());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ecscope_domain::ResourceHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InventorySource for CountingSource {
        async fn list(
            &self,
            kind: ResourceKind,
            scope: &Scope,
        ) -> Result<Vec<ResourceHandle>, InventoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Hold the call open long enough for contenders to pile up
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(InventoryError::new(kind, scope.clone(), "connection refused"));
            }
            Ok(vec![ResourceHandle::new(kind, "prod", "prod")])
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_upstream_call() {
        let cache = Arc::new(InventoryCache::new(
            CountingSource::new(),
            Duration::from_secs(60),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache
                    .list(ResourceKind::Service, &Scope::cluster("prod"))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(cache.source.calls(), 1);
    }

    #[tokio::test]
    async fn fresh_snapshot_is_reused_within_ttl() {
        let cache = InventoryCache::new(CountingSource::new(), Duration::from_secs(60));
        let first = cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        let second = cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.source.calls(), 1);
    }

    #[tokio::test]
    async fn expired_snapshot_is_refetched() {
        let cache = InventoryCache::new(CountingSource::new(), Duration::ZERO);
        cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        assert_eq!(cache.source.calls(), 2);
    }

    #[tokio::test]
    async fn distinct_scopes_use_distinct_slots() {
        let cache = InventoryCache::new(CountingSource::new(), Duration::from_secs(60));
        cache
            .list(ResourceKind::Service, &Scope::cluster("prod"))
            .await
            .unwrap();
        cache
            .list(ResourceKind::Service, &Scope::cluster("staging"))
            .await
            .unwrap();
        assert_eq!(cache.source.calls(), 2);
    }

    #[tokio::test]
    async fn upstream_failure_propagates_without_stale_fallback() {
        let cache = InventoryCache::new(CountingSource::failing(), Duration::from_secs(60));
        let err = cache
            .list(ResourceKind::Service, &Scope::cluster("prod"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.kind, ResourceKind::Service);
    }

    #[tokio::test]
    async fn refresh_bypasses_ttl() {
        let cache = InventoryCache::new(CountingSource::new(), Duration::from_secs(60));
        cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        cache.refresh(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        assert_eq!(cache.source.calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_drops_the_slot() {
        let cache = InventoryCache::new(CountingSource::new(), Duration::from_secs(60));
        cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        cache.invalidate(ResourceKind::Cluster, &Scope::Region);
        cache.list(ResourceKind::Cluster, &Scope::Region).await.unwrap();
        assert_eq!(cache.source.calls(), 2);
    }
}
