//! Precomputed network: snapshot building and the swappable live network.

mod builder;
mod snapshot;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::dataset::{Dataset, DatasetError};
use crate::timetable::Timetable;

pub use builder::{BuildConfig, build, build_at};
pub use snapshot::{NetworkSnapshot, RideEdge, SnapshotError, WalkEdge};

/// Everything a routing request reads: catalog, snapshot and timetable.
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Network {
    pub catalog: Catalog,
    pub snapshot: NetworkSnapshot,
    pub timetable: Timetable,
}

impl Network {
    /// Build a network from a dataset, computing a fresh snapshot.
    pub fn from_dataset(dataset: &Dataset, config: &BuildConfig) -> Self {
        let catalog = Catalog::new(dataset);
        let snapshot = build(&catalog, config);
        let timetable = Timetable::new(dataset, &catalog);
        Self {
            catalog,
            snapshot,
            timetable,
        }
    }

    /// Build a network around a snapshot produced earlier.
    pub fn with_snapshot(dataset: &Dataset, snapshot: NetworkSnapshot) -> Self {
        let catalog = Catalog::new(dataset);
        let timetable = Timetable::new(dataset, &catalog);
        Self {
            catalog,
            snapshot,
            timetable,
        }
    }

    /// Load the dataset from `data_dir`, reusing the snapshot at
    /// `snapshot_path` when it can be read and building one otherwise.
    pub fn load(
        data_dir: impl AsRef<Path>,
        snapshot_path: Option<&Path>,
        config: &BuildConfig,
    ) -> Result<Self, DatasetError> {
        let dataset = Dataset::load(data_dir)?;
        if dataset.is_empty() {
            warn!("dataset has no stops; every route query will fail");
        }

        if let Some(path) = snapshot_path {
            match NetworkSnapshot::load(path) {
                Ok(snapshot) => {
                    info!(
                        path = %path.display(),
                        generated_at = %snapshot.generated_at,
                        "using precomputed snapshot"
                    );
                    return Ok(Self::with_snapshot(&dataset, snapshot));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "snapshot unusable, rebuilding"),
            }
        }

        Ok(Self::from_dataset(&dataset, config))
    }
}

/// Shared handle to the live network.
///
/// Readers take an `Arc` to the current network and keep using it for the
/// whole request; a rebuild swaps in a new network wholesale.
#[derive(Clone)]
pub struct SharedNetwork {
    inner: Arc<RwLock<Arc<Network>>>,
}

impl SharedNetwork {
    pub fn new(network: Network) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(network))),
        }
    }

    /// The network currently in service.
    pub async fn current(&self) -> Arc<Network> {
        self.inner.read().await.clone()
    }

    /// Replace the live network. In-flight readers keep the old one.
    pub async fn replace(&self, network: Network) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(network);
    }
}
