// Client cache manager - validated handles keyed by credential
// Author: kelexine (https://github.com/kelexine)

use crate::auth::{Credential, PROBE_PROMPT};
use crate::cache::models::{CacheConfig, CacheStats, Clock, SystemClock};
use crate::error::{Result, StudioError};
use crate::gemini::{ClientFactory, ContentGenerator};
use crate::models::{GenerationParameters, RequestPayload};
use crate::utils::logging::sanitize;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Shared, immutable client bound to one validated credential.
pub type ClientHandle<C> = Arc<C>;

/// Entry keyed by its credential in the map.
struct CacheEntry<C> {
    handle: ClientHandle<C>,
    created_at: DateTime<Utc>,
}

/// A handle returned by [`ClientCache::acquire`].
pub struct Acquired<C> {
    pub handle: ClientHandle<C>,
    /// `true` when this lookup constructed the handle and ran its probe.
    pub probed: bool,
}

/// Owns validated client handles, one live entry per credential.
///
/// A lookup within the TTL returns the cached handle without any remote
/// call. A miss or stale entry builds a new handle, probes it once, and
/// installs it only if the probe succeeds. Stale entries are replaced on
/// access; nothing is evicted in the background.
///
/// Creation for a credential is serialized by a per-credential lock with a
/// re-check after acquiring it, so concurrent misses for the same key run a
/// single probe and readers never see a half-built entry.
pub struct ClientCache<F: ClientFactory> {
    factory: F,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<Credential, CacheEntry<F::Client>>>,
    creation_locks: parking_lot::Mutex<HashMap<Credential, Arc<Mutex<()>>>>,
    stats: RwLock<CacheStats>,
}

impl<F: ClientFactory> ClientCache<F> {
    /// Create a new cache using the wall clock.
    pub fn new(factory: F, config: CacheConfig) -> Self {
        Self::with_clock(factory, config, Arc::new(SystemClock))
    }

    pub fn with_clock(factory: F, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            factory,
            config,
            clock,
            entries: RwLock::new(HashMap::new()),
            creation_locks: parking_lot::Mutex::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the live handle for `credential`, creating and probing one if
    /// needed. Fails with [`StudioError::ValidationFailed`] when the probe
    /// fails; nothing is cached in that case.
    pub async fn get_or_create(&self, credential: &Credential) -> Result<ClientHandle<F::Client>> {
        self.acquire(credential).await.map(|acquired| acquired.handle)
    }

    /// Like [`ClientCache::get_or_create`], also reporting whether the
    /// handle was probed by this call.
    pub async fn acquire(&self, credential: &Credential) -> Result<Acquired<F::Client>> {
        // Fast path: live entry.
        if let Some(handle) = self.lookup(credential).await {
            return Ok(Acquired { handle, probed: false });
        }

        let lock = {
            let mut locks = self.creation_locks.lock();
            locks
                .entry(credential.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let result = {
            let _guard = lock.lock().await;

            // Re-verify after gaining the lock.
            match self.lookup(credential).await {
                Some(handle) => {
                    debug!("Handle for key {} created by a concurrent request", credential.fingerprint());
                    Ok(Acquired { handle, probed: false })
                }
                None => self.create_and_install(credential).await,
            }
        };

        self.release_creation_lock(credential, lock);
        result
    }

    /// Issue one probe call through `handle`.
    pub async fn probe(&self, handle: &F::Client) -> Result<()> {
        handle
            .generate_content(
                &self.config.probe_model,
                &RequestPayload::new(PROBE_PROMPT),
                &GenerationParameters::default(),
            )
            .await
            .map(|_| ())
    }

    /// Drop the entry for `credential`. Returns whether one existed.
    pub async fn evict(&self, credential: &Credential) -> bool {
        let removed = self.entries.write().await.remove(credential).is_some();
        if removed {
            debug!("Evicted handle for key {}", credential.fingerprint());
        }
        removed
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        debug!("Client cache cleared");
    }

    /// Number of entries that are still within the TTL.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| self.is_live(entry, now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    fn is_live(&self, entry: &CacheEntry<F::Client>, now: DateTime<Utc>) -> bool {
        now - entry.created_at < self.config.ttl
    }

    async fn lookup(&self, credential: &Credential) -> Option<ClientHandle<F::Client>> {
        let now = self.clock.now();
        let handle = {
            let entries = self.entries.read().await;
            entries
                .get(credential)
                .filter(|entry| self.is_live(entry, now))
                .map(|entry| entry.handle.clone())
        };

        if handle.is_some() {
            debug!("Client cache hit for key {}", credential.fingerprint());
            self.stats.write().await.hits += 1;
            crate::metrics::record_client_cache("hit");
        }
        handle
    }

    async fn create_and_install(&self, credential: &Credential) -> Result<Acquired<F::Client>> {
        debug!("Client cache miss for key {}", credential.fingerprint());
        self.stats.write().await.misses += 1;
        crate::metrics::record_client_cache("miss");

        let handle = Arc::new(self.factory.create(credential)?);

        if let Err(e) = self.probe(&handle).await {
            warn!(
                "Probe failed for key {}: {}",
                credential.fingerprint(),
                sanitize(&e.to_string())
            );
            self.stats.write().await.probe_failures += 1;
            crate::metrics::record_client_cache("probe_failure");
            return Err(StudioError::ValidationFailed(Box::new(e)));
        }

        let entry = CacheEntry {
            handle: handle.clone(),
            created_at: self.clock.now(),
        };
        // Replaces any stale entry for this credential.
        self.entries.write().await.insert(credential.clone(), entry);
        self.stats.write().await.creates += 1;
        crate::metrics::record_client_cache("create");
        info!("Validated client cached for key {}", credential.fingerprint());

        Ok(Acquired { handle, probed: true })
    }

    fn release_creation_lock(&self, credential: &Credential, lock: Arc<Mutex<()>>) {
        let mut locks = self.creation_locks.lock();
        // One reference in the map plus ours: nobody else is waiting.
        let idle = Arc::strong_count(&lock) <= 2;
        drop(lock);
        if idle {
            locks.remove(credential);
        }
    }
}
