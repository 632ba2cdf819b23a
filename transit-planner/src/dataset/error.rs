//! Dataset loading errors.

use std::path::PathBuf;

/// Errors that prevent the dataset from being loaded at all.
///
/// Semantically unusable rows are not errors; they are skipped and logged.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// A table file could not be read.
    #[error("failed to read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table file is not structurally valid.
    #[error("malformed {}: {source}", file.display())]
    Json {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
