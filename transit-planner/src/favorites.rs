//! Saved and recently used items.
//!
//! Both lists live in the key-value store as JSON arrays under the keys
//! `favorites` and `recentItems`. Updates are read-modify-write cycles on a
//! whole list, so they run one at a time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::cache::{Clock, SystemClock};
use crate::domain::StopCode;
use crate::store::{KeyValueStore, StoreError};

const FAVORITES_KEY: &str = "favorites";
const RECENT_KEY: &str = "recentItems";

/// Recent items kept, newest first.
pub const MAX_RECENT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedItemType {
    Route,
    Timetable,
    CustomRoute,
}

/// Endpoints of a saved route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEndpoints {
    pub start: StopCode,
    pub end: StopCode,
}

/// A favorite or recent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    pub id: String,
    pub title: String,

    #[serde(rename = "type")]
    pub kind: SavedItemType,

    /// Epoch milliseconds; set when the item is recorded as recent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_data: Option<RouteEndpoints>,
}

impl SavedItem {
    /// A route item identified by its endpoints.
    pub fn route(start: StopCode, end: StopCode, title: impl Into<String>) -> Self {
        Self {
            id: format!("route_{start}_{end}"),
            title: title.into(),
            kind: SavedItemType::Route,
            timestamp: None,
            route_data: Some(RouteEndpoints { start, end }),
        }
    }
}

/// Favorites and recents over a key-value store.
#[derive(Debug, Clone)]
pub struct Favorites<S, C = SystemClock> {
    store: S,
    clock: C,
    /// Held across each read-modify-write; shared by clones.
    updates: Arc<Mutex<()>>,
}

impl<S: KeyValueStore> Favorites<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> Favorites<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            updates: Arc::new(Mutex::new(())),
        }
    }

    /// Saved favorites, in insertion order. Unreadable data reads as empty.
    pub async fn list(&self) -> Vec<SavedItem> {
        self.read(FAVORITES_KEY).await
    }

    /// Add a favorite; an item whose id is already saved is ignored.
    pub async fn add(&self, item: SavedItem) -> Result<(), StoreError> {
        let _guard = self.updates.lock().await;
        let mut items = self.read(FAVORITES_KEY).await;
        if items.iter().any(|i| i.id == item.id) {
            return Ok(());
        }
        items.push(item);
        self.write(FAVORITES_KEY, &items).await
    }

    /// Remove the favorite with `id`, if any.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.updates.lock().await;
        let mut items = self.read(FAVORITES_KEY).await;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Ok(());
        }
        self.write(FAVORITES_KEY, &items).await
    }

    /// Recently used items, newest first.
    pub async fn recent(&self) -> Vec<SavedItem> {
        self.read(RECENT_KEY).await
    }

    /// Move `item` to the front of the recents with a fresh timestamp.
    pub async fn add_recent(&self, mut item: SavedItem) -> Result<(), StoreError> {
        let _guard = self.updates.lock().await;
        let mut items = self.read(RECENT_KEY).await;
        items.retain(|i| i.id != item.id);

        item.timestamp = Some(self.clock.now().timestamp_millis());
        items.insert(0, item);
        items.truncate(MAX_RECENT);

        self.write(RECENT_KEY, &items).await
    }

    /// Forget both favorites and recents.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.updates.lock().await;
        self.store.remove(FAVORITES_KEY).await?;
        self.store.remove(RECENT_KEY).await
    }

    async fn read(&self, key: &str) -> Vec<SavedItem> {
        match self.store.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "ignoring unreadable saved items");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read saved items");
                Vec::new()
            }
        }
    }

    async fn write(&self, key: &str, items: &[SavedItem]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.store.set(key, json).await
    }
}
