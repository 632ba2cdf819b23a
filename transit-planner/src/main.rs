use tracing::{error, info, warn};

use transit_planner::config::ServerConfig;
use transit_planner::geometry::{OsrmClient, OsrmConfig};
use transit_planner::logging;
use transit_planner::network::{BuildConfig, Network};
use transit_planner::store::{FileStore, MemoryStore, Store};
use transit_planner::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    logging::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };

    // Loading and indexing is CPU-bound; keep it off the async workers
    let data_dir = config.data_dir.clone();
    let snapshot = config.snapshot.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        Network::load(&data_dir, snapshot.as_deref(), &BuildConfig::default())
    })
    .await;
    let network = match loaded {
        Ok(Ok(network)) => network,
        Ok(Err(e)) => {
            error!(data_dir = %config.data_dir.display(), error = %e, "failed to load network");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "network loading task failed");
            std::process::exit(1);
        }
    };
    info!(
        stops = network.catalog.stops().len(),
        ride_edges = network.snapshot.ride_edge_count(),
        walk_edges = network.snapshot.walk_edge_count(),
        "network ready"
    );

    let store = match &config.cache_file {
        Some(path) => match FileStore::open(path).await {
            Ok(store) => Store::File(store),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to in-memory store");
                Store::Memory(MemoryStore::default())
            }
        },
        None => Store::Memory(MemoryStore::default()),
    };

    let geometry = config
        .osrm_url
        .as_ref()
        .and_then(|url| match OsrmClient::new(OsrmConfig::new(url)) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(%url, error = %e, "road geometry disabled");
                None
            }
        });

    let state = AppState::new(network, store, geometry, &config);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind, "transit planner listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
