//! Application state for the web layer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::RouteCache;
use crate::config::ServerConfig;
use crate::favorites::Favorites;
use crate::geometry::OsrmClient;
use crate::network::{BuildConfig, Network, SharedNetwork};
use crate::planner::SearchConfig;
use crate::store::Store;

/// Where a reload reads the dataset from.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    pub data_dir: PathBuf,
    pub build: BuildConfig,
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// The live network, swapped wholesale on reload
    pub network: SharedNetwork,

    /// Cache of computed routes
    pub routes: Arc<RouteCache<Store>>,

    /// Favorites and recent searches
    pub favorites: Arc<Favorites<Store>>,

    /// Road geometry service, if configured
    pub geometry: Option<Arc<OsrmClient>>,

    /// Route search configuration
    pub search: Arc<SearchConfig>,

    pub source: Arc<NetworkSource>,

    /// Budget for one route search
    pub search_timeout: Duration,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        network: Network,
        store: Store,
        geometry: Option<OsrmClient>,
        config: &ServerConfig,
    ) -> Self {
        let routes = RouteCache::new(store.clone()).with_generation(network.snapshot.generated_at);
        Self {
            network: SharedNetwork::new(network),
            routes: Arc::new(routes),
            favorites: Arc::new(Favorites::new(store)),
            geometry: geometry.map(Arc::new),
            search: Arc::new(SearchConfig::default()),
            source: Arc::new(NetworkSource {
                data_dir: config.data_dir.clone(),
                build: BuildConfig::default(),
            }),
            search_timeout: config.search_timeout,
        }
    }
}
