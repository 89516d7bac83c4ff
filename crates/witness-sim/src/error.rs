//! Error types for the demo binary.

use std::path::PathBuf;

/// Top-level error for the demo binary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: witness_core::ConfigError,
    },

    /// `WITNESS_CONFIG` names a file that does not exist.
    #[error("config file not found: {}", path.display())]
    MissingConfig {
        /// The path that was requested.
        path: PathBuf,
    },

    /// A scripted intent could not be built.
    #[error("scenario error: {source}")]
    Scenario {
        /// The underlying type error.
        #[from]
        source: witness_types::TypeError,
    },

    /// An intent parameter could not be encoded.
    #[error("parameter encoding error: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A batch could not be run to completion.
    #[error("batch error: {source}")]
    Batch {
        /// The underlying batch error.
        #[from]
        source: witness_core::BatchError,
    },
}
