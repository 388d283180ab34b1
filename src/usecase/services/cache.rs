use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::domain::entities::row::Row;
use crate::usecase::ports::fetch::FetchError;

pub type FetchResult = Result<Arc<Vec<Row>>, FetchError>;

pub const CACHE_KEY_FIELD: &str = "cacheKey";

#[derive(Debug, Clone)]
struct CacheEntry {
    params: Value,
    result: FetchResult,
    fetched_at: DateTime<Utc>,
    refresh_interval: Option<Duration>,
    stale: bool,
}

impl CacheEntry {
    fn needs_refetch(&self, now: DateTime<Utc>) -> bool {
        self.stale
            || self
                .refresh_interval
                .is_some_and(|interval| now - self.fetched_at >= interval)
    }
}

/// Snapshot of one cached request.
#[derive(Debug, Clone)]
pub struct CachedFetch {
    pub result: FetchResult,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

/// Process-wide fetch cache keyed by request parameters.
///
/// Invalidation flags entries stale instead of dropping them; they are
/// refetched on their next read. Once more than `capacity` requests are
/// cached, the ones fetched longest ago are evicted.
#[derive(Debug)]
pub struct CacheService {
    entries: RwLock<HashMap<String, CacheEntry>>,
    capacity: usize,
}

impl Default for CacheService {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl CacheService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Canonical key of a parameter object.
    pub fn key_for(params: &Value) -> String {
        params.to_string()
    }

    pub fn register(&self, params: Value, result: FetchResult, refresh_interval: Option<Duration>) {
        self.register_at(params, result, refresh_interval, Utc::now());
    }

    fn register_at(
        &self,
        params: Value,
        result: FetchResult,
        refresh_interval: Option<Duration>,
        fetched_at: DateTime<Utc>,
    ) {
        let key = Self::key_for(&params);
        let mut entries = self.entries.write();
        entries.insert(
            key.clone(),
            CacheEntry {
                params,
                result,
                fetched_at,
                refresh_interval,
                stale: false,
            },
        );

        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .filter(|(existing, _)| **existing != key)
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(existing, _)| existing.clone());
            let Some(oldest) = oldest else {
                break;
            };
            debug!(key = %oldest, "evicting cache entry");
            entries.remove(&oldest);
        }
    }

    pub fn lookup(&self, params: &Value) -> Option<CachedFetch> {
        let now = Utc::now();
        self.entries
            .read()
            .get(&Self::key_for(params))
            .map(|entry| CachedFetch {
                result: entry.result.clone(),
                fetched_at: entry.fetched_at,
                stale: entry.needs_refetch(now),
            })
    }

    /// Returns the cached result unless it is missing, stale or past its
    /// refresh interval, in which case `fetch` runs and its result is stored.
    ///
    /// The lock is not held while `fetch` runs.
    pub fn fetch_with<F>(
        &self,
        params: Value,
        refresh_interval: Option<Duration>,
        fetch: F,
    ) -> FetchResult
    where
        F: FnOnce() -> Result<Vec<Row>, FetchError>,
    {
        let key = Self::key_for(&params);
        let now = Utc::now();
        if let Some(entry) = self.entries.read().get(&key) {
            if !entry.needs_refetch(now) {
                debug!(%key, "cache hit");
                return entry.result.clone();
            }
        }

        debug!(%key, "cache miss");
        let result = fetch().map(Arc::new);
        self.register(params, result.clone(), refresh_interval);
        result
    }

    /// Flags every entry whose parameters satisfy `predicate`. The predicate
    /// is evaluated against the live entries at call time.
    pub fn revalidate_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Value) -> bool,
    {
        let mut entries = self.entries.write();
        let mut flagged = 0;
        for entry in entries.values_mut() {
            if predicate(&entry.params) {
                entry.stale = true;
                flagged += 1;
            }
        }
        flagged
    }

    /// Flags every entry fetched with `cacheKey == key`, whatever else its
    /// parameters contain. No match is not an error.
    pub fn invalidate(&self, key: &str) -> usize {
        let flagged = self.revalidate_where(|params| {
            params
                .as_object()
                .and_then(|object| object.get(CACHE_KEY_FIELD))
                .and_then(Value::as_str)
                == Some(key)
        });
        info!(cache_key = key, flagged, "invalidated cache entries");
        flagged
    }

    pub fn revalidate(&self, params: &Value) -> bool {
        let key = Self::key_for(params);
        match self.entries.write().get_mut(&key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
