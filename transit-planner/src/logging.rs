//! Tracing subscriber setup shared by the binaries.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// An unparsable `RUST_LOG` falls back to the default level.
pub fn init() {
    let default_level = LevelFilter::INFO;
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(raw) => EnvFilter::try_new(&raw).unwrap_or_else(|err| {
            eprintln!(
                "invalid {}={raw:?}, falling back to '{default_level}': {err}",
                EnvFilter::DEFAULT_ENV
            );
            EnvFilter::new(default_level.to_string())
        }),
        Err(_) => EnvFilter::new(default_level.to_string()),
    };

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init();
}
