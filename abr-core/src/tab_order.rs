//! Per-user, per-page tab order preferences.
//!
//! `TabOrderStore` is a cloneable handle over a shared cache and an injected
//! persistence backend. Writes update the cache for their key and are
//! broadcast to subscribers, so every consumer holding a clone observes the
//! new order without refetching.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::error::Result;
use crate::nav::{apply_order, NavTab, TabOrderKey};

/// Buffered change notifications per subscriber
const CHANGE_CAPACITY: usize = 64;

/// Remote persistence boundary for tab orders
#[async_trait]
pub trait TabOrderBackend: Send + Sync {
    /// Stored order for `key`, or `None` when the user never reordered
    async fn fetch_order(&self, key: &TabOrderKey) -> Result<Option<Vec<String>>>;

    /// Replace the stored order, returning what was persisted
    async fn replace_order(&self, key: &TabOrderKey, order: &[String]) -> Result<Vec<String>>;

    /// Drop the stored order so the page falls back to its defaults
    async fn clear_order(&self, key: &TabOrderKey) -> Result<()>;
}

/// In-process backend used by tests and the dashboard's offline mode
#[derive(Debug, Default)]
pub struct MemoryTabOrderBackend {
    orders: RwLock<HashMap<TabOrderKey, Vec<String>>>,
}

impl MemoryTabOrderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with existing preferences
    pub fn with_orders(orders: impl IntoIterator<Item = (TabOrderKey, Vec<String>)>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TabOrderBackend for MemoryTabOrderBackend {
    async fn fetch_order(&self, key: &TabOrderKey) -> Result<Option<Vec<String>>> {
        Ok(self.orders.read().await.get(key).cloned())
    }

    async fn replace_order(&self, key: &TabOrderKey, order: &[String]) -> Result<Vec<String>> {
        self.orders.write().await.insert(key.clone(), order.to_vec());
        Ok(order.to_vec())
    }

    async fn clear_order(&self, key: &TabOrderKey) -> Result<()> {
        self.orders.write().await.remove(key);
        Ok(())
    }
}

/// Cache view of one key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderState {
    /// Not fetched yet; render the default order
    #[default]
    Pending,
    /// A stored order exists
    Loaded(Vec<String>),
    /// The user has no stored order
    Missing,
    /// Last fetch failed; render the default order
    Failed,
}

impl OrderState {
    /// The stored order, when one is known
    pub fn order(&self) -> Option<&[String]> {
        match self {
            OrderState::Loaded(order) => Some(order),
            _ => None,
        }
    }
}

/// Notification sent after a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderChange {
    pub key: TabOrderKey,
    /// New order, or `None` after a reset
    pub order: Option<Vec<String>>,
}

#[derive(Debug, Default)]
struct CacheEntry {
    state: OrderState,
    /// Successful writes seen for this key; fetches started before a write
    /// must not overwrite it
    writes: u64,
}

/// Keyed tab-order store with a shared cache
#[derive(Clone)]
pub struct TabOrderStore {
    backend: Arc<dyn TabOrderBackend>,
    cache: Arc<RwLock<HashMap<TabOrderKey, CacheEntry>>>,
    changes: broadcast::Sender<OrderChange>,
}

impl TabOrderStore {
    pub fn new(backend: Arc<dyn TabOrderBackend>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            backend,
            cache: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Store backed by a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTabOrderBackend::new()))
    }

    /// Current cache state for `key` without touching the backend.
    pub async fn peek(&self, key: &TabOrderKey) -> OrderState {
        self.cache
            .read()
            .await
            .get(key)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Stored order for `key`, fetching only when the cache has no answer.
    ///
    /// On failure the error is logged and returned; callers keep rendering
    /// their default order.
    pub async fn get_order(&self, key: &TabOrderKey) -> Result<Option<Vec<String>>> {
        match self.peek(key).await {
            OrderState::Loaded(order) => Ok(Some(order)),
            OrderState::Missing => Ok(None),
            OrderState::Pending | OrderState::Failed => self.refresh(key).await,
        }
    }

    /// Fetch `key` from the backend regardless of cache state.
    pub async fn refresh(&self, key: &TabOrderKey) -> Result<Option<Vec<String>>> {
        let writes_before = self.writes(key).await;

        match self.backend.fetch_order(key).await {
            Ok(order) => {
                let mut cache = self.cache.write().await;
                let entry = cache.entry(key.clone()).or_default();
                if entry.writes != writes_before {
                    debug!(key = %key, "discarding tab order fetch superseded by a write");
                    return Ok(entry.state.order().map(<[String]>::to_vec));
                }
                entry.state = match &order {
                    Some(order) => OrderState::Loaded(order.clone()),
                    None => OrderState::Missing,
                };
                Ok(order)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "tab order fetch failed, using default order");
                let mut cache = self.cache.write().await;
                let entry = cache.entry(key.clone()).or_default();
                if entry.writes == writes_before && entry.state == OrderState::Pending {
                    entry.state = OrderState::Failed;
                }
                Err(err)
            }
        }
    }

    /// Persist `order` as the full replacement for `key`.
    ///
    /// Concurrent writes to one key resolve by completion order. On failure
    /// nothing is rolled back; the caller decides what to render.
    pub async fn set_order(&self, key: &TabOrderKey, order: Vec<String>) -> Result<Vec<String>> {
        let persisted = match self.backend.replace_order(key, &order).await {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(key = %key, error = %err, "tab order save failed");
                return Err(err);
            }
        };

        self.record_write(key, OrderState::Loaded(persisted.clone()))
            .await;
        debug!(key = %key, order = ?persisted, "tab order saved");
        let _ = self.changes.send(OrderChange {
            key: key.clone(),
            order: Some(persisted.clone()),
        });
        Ok(persisted)
    }

    /// Forget the stored order for `key`.
    pub async fn reset_order(&self, key: &TabOrderKey) -> Result<()> {
        if let Err(err) = self.backend.clear_order(key).await {
            warn!(key = %key, error = %err, "tab order reset failed");
            return Err(err);
        }

        self.record_write(key, OrderState::Missing).await;
        let _ = self.changes.send(OrderChange {
            key: key.clone(),
            order: None,
        });
        Ok(())
    }

    /// `defaults` sorted by the cached order for `key`, or unchanged while
    /// the order is pending, missing or failed.
    pub async fn resolve(&self, key: &TabOrderKey, defaults: &[NavTab]) -> Vec<NavTab> {
        match self.peek(key).await {
            OrderState::Loaded(order) => apply_order(defaults, &order),
            _ => defaults.to_vec(),
        }
    }

    /// Receive every successful write made through any clone of this store
    pub fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.changes.subscribe()
    }

    async fn writes(&self, key: &TabOrderKey) -> u64 {
        self.cache
            .read()
            .await
            .get(key)
            .map(|entry| entry.writes)
            .unwrap_or(0)
    }

    async fn record_write(&self, key: &TabOrderKey, state: OrderState) {
        let mut cache = self.cache.write().await;
        let entry = cache.entry(key.clone()).or_default();
        entry.state = state;
        entry.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AbrError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// Counts fetches so tests can prove the cache answered
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryTabOrderBackend,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl TabOrderBackend for CountingBackend {
        async fn fetch_order(&self, key: &TabOrderKey) -> Result<Option<Vec<String>>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_order(key).await
        }

        async fn replace_order(&self, key: &TabOrderKey, order: &[String]) -> Result<Vec<String>> {
            self.inner.replace_order(key, order).await
        }

        async fn clear_order(&self, key: &TabOrderKey) -> Result<()> {
            self.inner.clear_order(key).await
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl TabOrderBackend for FailingBackend {
        async fn fetch_order(&self, _key: &TabOrderKey) -> Result<Option<Vec<String>>> {
            Err(AbrError::backend("503 Service Unavailable"))
        }

        async fn replace_order(&self, _key: &TabOrderKey, _order: &[String]) -> Result<Vec<String>> {
            Err(AbrError::backend("503 Service Unavailable"))
        }

        async fn clear_order(&self, _key: &TabOrderKey) -> Result<()> {
            Err(AbrError::backend("503 Service Unavailable"))
        }
    }

    /// Fetch blocks until released and then returns a fixed stale order
    struct GatedBackend {
        started: Notify,
        gate: Notify,
        stale: Vec<String>,
        inner: MemoryTabOrderBackend,
    }

    #[async_trait]
    impl TabOrderBackend for GatedBackend {
        async fn fetch_order(&self, _key: &TabOrderKey) -> Result<Option<Vec<String>>> {
            self.started.notify_one();
            self.gate.notified().await;
            Ok(Some(self.stale.clone()))
        }

        async fn replace_order(&self, key: &TabOrderKey, order: &[String]) -> Result<Vec<String>> {
            self.inner.replace_order(key, order).await
        }

        async fn clear_order(&self, key: &TabOrderKey) -> Result<()> {
            self.inner.clear_order(key).await
        }
    }

    #[tokio::test]
    async fn set_then_get_observes_new_order_without_refetch() {
        let backend = Arc::new(CountingBackend::default());
        let store = TabOrderStore::new(backend.clone());
        let key = TabOrderKey::new("user1", "tasks");

        store.set_order(&key, order(&["b", "a"])).await.unwrap();

        assert_eq!(store.get_order(&key).await.unwrap(), Some(order(&["b", "a"])));
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_key_is_pending_then_missing() {
        let store = TabOrderStore::in_memory();
        let key = TabOrderKey::new("user1", "parts");

        assert_eq!(store.peek(&key).await, OrderState::Pending);
        assert_eq!(store.get_order(&key).await.unwrap(), None);
        assert_eq!(store.peek(&key).await, OrderState::Missing);
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_defaults() {
        let store = TabOrderStore::new(Arc::new(FailingBackend));
        let key = TabOrderKey::new("user1", "tasks");
        let defaults = vec![NavTab::new("a", "A", 2), NavTab::new("b", "B", 5)];

        assert!(store.get_order(&key).await.is_err());
        assert_eq!(store.peek(&key).await, OrderState::Failed);
        assert_eq!(store.resolve(&key, &defaults).await, defaults);
    }

    #[tokio::test]
    async fn save_failure_is_reported_and_cache_untouched() {
        let store = TabOrderStore::new(Arc::new(FailingBackend));
        let key = TabOrderKey::new("user1", "tasks");

        let err = store.set_order(&key, order(&["b", "a"])).await.unwrap_err();
        assert!(matches!(err, AbrError::Backend { .. }));
        assert_eq!(store.peek(&key).await, OrderState::Pending);
    }

    #[tokio::test]
    async fn clones_share_cache_and_notifications() {
        let store = TabOrderStore::in_memory();
        let other = store.clone();
        let mut changes = other.subscribe();
        let key = TabOrderKey::new("user1", "work-orders");

        store.set_order(&key, order(&["done", "open"])).await.unwrap();

        assert_eq!(other.peek(&key).await.order(), Some(&order(&["done", "open"])[..]));
        let change = changes.recv().await.unwrap();
        assert_eq!(change.key, key);
        assert_eq!(change.order, Some(order(&["done", "open"])));
    }

    #[tokio::test]
    async fn reset_returns_to_defaults() {
        let store = TabOrderStore::in_memory();
        let key = TabOrderKey::new("user1", "tasks");
        let defaults = vec![NavTab::new("a", "A", 0), NavTab::new("b", "B", 0)];

        store.set_order(&key, order(&["b", "a"])).await.unwrap();
        store.reset_order(&key).await.unwrap();

        assert_eq!(store.peek(&key).await, OrderState::Missing);
        assert_eq!(store.resolve(&key, &defaults).await, defaults);
        assert_eq!(store.refresh(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn late_fetch_does_not_clobber_newer_write() {
        let backend = Arc::new(GatedBackend {
            started: Notify::new(),
            gate: Notify::new(),
            stale: order(&["a", "b"]),
            inner: MemoryTabOrderBackend::new(),
        });
        let store = TabOrderStore::new(backend.clone());
        let key = TabOrderKey::new("user1", "tasks");

        let fetch = {
            let store = store.clone();
            let key = key.clone();
            tokio::spawn(async move { store.refresh(&key).await })
        };
        backend.started.notified().await;

        store.set_order(&key, order(&["b", "a"])).await.unwrap();
        backend.gate.notify_one();

        let fetched = fetch.await.unwrap().unwrap();
        assert_eq!(fetched, Some(order(&["b", "a"])));
        assert_eq!(store.peek(&key).await, OrderState::Loaded(order(&["b", "a"])));
    }
}
