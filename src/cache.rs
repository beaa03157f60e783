//! In-memory cart sessions using moka
//!
//! Live quote stores are cached by session id. A session evicted from the
//! cache is reopened from its persisted record on next access. Storage
//! adapters are synchronous, so opening a store runs on the blocking pool.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::Catalog;
use crate::quote::persistence::{storage_key, QuotePersistence};
use crate::quote::QuoteStore;

pub type SharedStore = Arc<Mutex<QuoteStore>>;

/// Registry of live cart sessions
#[derive(Clone)]
pub struct CartSessions {
    carts: Cache<Uuid, SharedStore>,
    catalog: Arc<Catalog>,
    persistence: Arc<dyn QuotePersistence>,
}

impl CartSessions {
    /// Create a registry holding at most `capacity` live carts, each kept
    /// for `idle_ttl` after its last access
    pub fn new(
        catalog: Arc<Catalog>,
        persistence: Arc<dyn QuotePersistence>,
        capacity: u64,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle_ttl)
                .build(),
            catalog,
            persistence,
        }
    }

    /// Start a new, empty cart session
    pub async fn create(&self) -> Result<(Uuid, SharedStore)> {
        let session_id = Uuid::new_v4();
        let key = storage_key(&session_id.to_string());
        let catalog = self.catalog.clone();
        let persistence = self.persistence.clone();
        let store = run_blocking(move || QuoteStore::open(key, catalog, persistence)).await?;

        let shared = Arc::new(Mutex::new(store));
        self.carts.insert(session_id, shared.clone()).await;
        info!("Created cart session {}", session_id);
        Ok((session_id, shared))
    }

    /// Look up a session, reopening it from storage if it was evicted
    pub async fn get(&self, session_id: Uuid) -> Result<Option<SharedStore>> {
        if let Some(cached) = self.carts.get(&session_id).await {
            debug!("Cache HIT for cart session: {}", session_id);
            return Ok(Some(cached));
        }

        debug!("Cache MISS for cart session: {}", session_id);
        let key = storage_key(&session_id.to_string());
        let catalog = self.catalog.clone();
        let persistence = self.persistence.clone();
        let Some(store) =
            run_blocking(move || QuoteStore::open_existing(key, catalog, persistence)).await?
        else {
            return Ok(None);
        };

        let shared = Arc::new(Mutex::new(store));
        self.carts.insert(session_id, shared.clone()).await;
        Ok(Some(shared))
    }

    /// Drop a session from memory; its persisted record is kept
    pub async fn evict(&self, session_id: Uuid) {
        self.carts.invalidate(&session_id).await;
    }

    /// Cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            live_carts: self.carts.entry_count(),
        }
    }
}

/// Run synchronous storage work on the blocking pool.
///
/// A panic in `work` comes back as `AppError::Internal`.
pub async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub live_carts: u64,
}
