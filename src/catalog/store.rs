//! Snapshot store for the live catalog.
//!
//! Hands out immutable snapshots. A refresh builds a complete new snapshot
//! off to the side and swaps it in under a short write lock; readers holding
//! the previous `Arc` keep using it undisturbed.
//!
//! At most one reload runs at a time. While it runs, and for one refresh
//! interval after it fails, callers get the stale snapshot immediately.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use super::error::CatalogResult;
use super::source::CatalogSource;
use super::types::Catalog;
use crate::relations::RelationGraph;

/// One consistent view of the database schema.
#[derive(Debug)]
pub struct Snapshot {
    pub catalog: Arc<Catalog>,
    pub relations: Arc<RelationGraph>,
    pub loaded_at: Instant,
}

impl Snapshot {
    pub fn new(catalog: Catalog) -> Self {
        let relations = RelationGraph::from_catalog(&catalog);
        Self {
            catalog: Arc::new(catalog),
            relations: Arc::new(relations),
            loaded_at: Instant::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        !ttl.is_zero() && self.loaded_at.elapsed() >= ttl
    }
}

/// Caches catalog snapshots loaded from a [`CatalogSource`].
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    /// Zero disables time-based refresh.
    refresh_interval: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    /// Held for the duration of a reload; records the last failed attempt.
    reload: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>, refresh_interval: Duration) -> Self {
        Self {
            source,
            refresh_interval,
            current: RwLock::new(None),
            reload: Mutex::new(None),
        }
    }

    /// Current snapshot, loading it on first use or when it has expired.
    ///
    /// When a stale snapshot cannot be reloaded the old one keeps being
    /// served; only the very first load propagates the error.
    pub async fn snapshot(&self) -> CatalogResult<Arc<Snapshot>> {
        let cached = self.current.read().await.clone();
        match cached {
            Some(snapshot) if !snapshot.is_stale(self.refresh_interval) => Ok(snapshot),
            Some(stale) => Ok(self.reload_stale(stale).await),
            None => self.first_load().await,
        }
    }

    /// Reload the catalog now, replacing the current snapshot.
    pub async fn refresh(&self) -> CatalogResult<Arc<Snapshot>> {
        let mut last_failure = self.reload.lock().await;
        let fresh = self.load().await?;
        *self.current.write().await = Some(Arc::clone(&fresh));
        *last_failure = None;
        Ok(fresh)
    }

    /// Try one reload, or hand back `stale` if another caller is already
    /// reloading or the last attempt failed too recently.
    async fn reload_stale(&self, stale: Arc<Snapshot>) -> Arc<Snapshot> {
        let Ok(mut last_failure) = self.reload.try_lock() else {
            return stale;
        };
        if let Some(failed_at) = *last_failure {
            if failed_at.elapsed() < self.refresh_interval {
                return stale;
            }
        }

        // Another task may have finished a reload before we got the lock
        if let Some(current) = self.current.read().await.as_ref() {
            if !current.is_stale(self.refresh_interval) {
                return Arc::clone(current);
            }
        }

        match self.load().await {
            Ok(fresh) => {
                *self.current.write().await = Some(Arc::clone(&fresh));
                *last_failure = None;
                fresh
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog refresh failed, serving previous snapshot");
                *last_failure = Some(Instant::now());
                stale
            }
        }
    }

    /// Callers with nothing to fall back on queue behind a single load.
    async fn first_load(&self) -> CatalogResult<Arc<Snapshot>> {
        let _reloading = self.reload.lock().await;
        if let Some(current) = self.current.read().await.as_ref() {
            return Ok(Arc::clone(current));
        }

        let fresh = self.load().await?;
        *self.current.write().await = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    async fn load(&self) -> CatalogResult<Arc<Snapshot>> {
        let started = Instant::now();
        let catalog = self.source.snapshot().await?;
        let snapshot = Snapshot::new(catalog);

        tracing::info!(
            tables = snapshot.catalog.len(),
            foreign_keys = snapshot.relations.edge_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded catalog snapshot"
        );

        Ok(Arc::new(snapshot))
    }
}
