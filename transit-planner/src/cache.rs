//! Caching layer for computed routes.
//!
//! Entries are keyed by the ordered (start, end) pair, so A→B and B→A are
//! cached independently. An entry expires an hour after it was written; an
//! expired entry is deleted by the read that finds it.
//!
//! Each record also carries the generation stamp of the network it was
//! computed on. After a reload the stamp changes and older records read as
//! misses.
//!
//! The cache is advisory. Storage failures are logged and behave like a miss
//! (reads) or are dropped (writes).

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::StopCode;
use crate::planner::Itinerary;
use crate::store::KeyValueStore;

/// How long a cached route stays fresh.
pub const ROUTE_TTL: Duration = Duration::from_secs(60 * 60);

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Store key for a route.
pub fn route_key(start: StopCode, end: StopCode) -> String {
    format!("route_{start}_{end}")
}

/// Stored record: the steps plus the write time in epoch milliseconds.
#[derive(Debug, Serialize, Deserialize)]
struct CachedRoute {
    steps: Itinerary,
    timestamp: i64,
    start: StopCode,
    end: StopCode,
    /// Network generation stamp, epoch milliseconds.
    #[serde(default)]
    network: i64,
}

/// Route cache over a key-value store.
#[derive(Debug, Clone)]
pub struct RouteCache<S, C = SystemClock> {
    store: S,
    clock: C,
    ttl: Duration,
    generation: Arc<AtomicI64>,
}

impl<S: KeyValueStore> RouteCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> RouteCache<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            ttl: ROUTE_TTL,
            generation: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Tag entries with the network generated at `generated_at`.
    pub fn with_generation(self, generated_at: DateTime<Utc>) -> Self {
        self.set_generation(generated_at);
        self
    }

    /// Switch to a new network; entries written for any other network
    /// become misses.
    pub fn set_generation(&self, generated_at: DateTime<Utc>) {
        self.generation
            .store(generated_at.timestamp_millis(), Ordering::SeqCst);
    }

    /// Cached itinerary for (start, end), if present and fresh.
    pub async fn get(&self, start: StopCode, end: StopCode) -> Option<Itinerary> {
        let key = route_key(start, end);

        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "route cache read failed");
                return None;
            }
        };

        let cached: CachedRoute = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unreadable cached route");
                self.evict(&key).await;
                return None;
            }
        };

        if cached.network != self.generation.load(Ordering::SeqCst) {
            debug!(key = %key, "cached route is from another network");
            self.evict(&key).await;
            return None;
        }

        let age_ms = self.clock.now().timestamp_millis() - cached.timestamp;
        if age_ms > self.ttl.as_millis() as i64 {
            debug!(key = %key, age_ms, "cached route expired");
            self.evict(&key).await;
            return None;
        }

        debug!(key = %key, age_ms, "route cache hit");
        Some(cached.steps)
    }

    /// Store an itinerary for (start, end), replacing any previous entry.
    pub async fn put(&self, start: StopCode, end: StopCode, itinerary: &Itinerary) {
        let key = route_key(start, end);
        let record = CachedRoute {
            steps: itinerary.clone(),
            timestamp: self.clock.now().timestamp_millis(),
            start,
            end,
            network: self.generation.load(Ordering::SeqCst),
        };

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to encode route for caching");
                return;
            }
        };

        if let Err(e) = self.store.set(&key, json).await {
            warn!(key = %key, error = %e, "route cache write failed");
        }
    }

    /// Drop the entry for (start, end).
    pub async fn invalidate(&self, start: StopCode, end: StopCode) {
        self.evict(&route_key(start, end)).await;
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!(key = %key, error = %e, "route cache delete failed");
        }
    }
}
