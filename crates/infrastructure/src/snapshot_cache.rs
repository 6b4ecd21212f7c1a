use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use badgebridge_core::AppResult;
use tokio::sync::{Mutex, RwLock};

struct SnapshotEntry<T: ?Sized> {
    value: Arc<T>,
    expires_at: Instant,
}

/// Whole-value snapshot shared by concurrent readers.
///
/// An expired snapshot is replaced by a full reload; only one reload runs at a time.
pub(crate) struct SnapshotCache<T: ?Sized> {
    ttl: Duration,
    entry: RwLock<Option<SnapshotEntry<T>>>,
    refresh_guard: Mutex<()>,
}

impl<T: ?Sized + Send + Sync> SnapshotCache<T> {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    async fn fresh(&self) -> Option<Arc<T>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    pub(crate) async fn get_or_refresh<F, Fut>(&self, load: F) -> AppResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Arc<T>>>,
    {
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let _refresh = self.refresh_guard.lock().await;
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let value = load().await?;
        self.store(value.clone()).await;
        Ok(value)
    }

    /// Reloads the snapshot even when the current one is still fresh.
    pub(crate) async fn refresh<F, Fut>(&self, load: F) -> AppResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Arc<T>>>,
    {
        let _refresh = self.refresh_guard.lock().await;
        let value = load().await?;
        self.store(value.clone()).await;
        Ok(value)
    }

    async fn store(&self, value: Arc<T>) {
        if self.ttl.is_zero() {
            return;
        }

        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);
        *self.entry.write().await = Some(SnapshotEntry { value, expires_at });
    }

    pub(crate) async fn clear(&self) {
        self.entry.write().await.take();
    }
}
