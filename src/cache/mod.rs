//! In-memory TTL cache keyed by request URL.
//!
//! Expiry is lazy on every read, and [`spawn_sweeper`] removes expired
//! entries periodically so memory stays bounded between reads. There is no
//! size limit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::clock::Clock;

pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_millis(60_000);

struct Entry<V> {
    value: V,
    expires_at_ms: u64,
}

pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, DEFAULT_TTL)
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Insert with the cache's default TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at_ms = self.clock.now_ms().saturating_add(ttl_ms);
        self.lock().insert(
            key.into(),
            Entry {
                value,
                expires_at_ms,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of live entries. Expired entries are swept first.
    pub fn size(&self) -> usize {
        self.clean_expired();
        self.lock().len()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn clean_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at_ms > now);
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run `clean_expired` every `period` until the handle is aborted.
pub fn spawn_sweeper<V>(cache: Arc<TtlCache<V>>, period: Duration) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.clean_expired();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired cache entries");
            }
        }
    })
}
