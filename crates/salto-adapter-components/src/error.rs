//! Error types for salto-adapter-components

use thiserror::Error;

/// Result type alias for salto-adapter-components operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running adapter components
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A template could not be turned back into its service representation
    #[error("cannot serialize template in '{field}': {message}")]
    TemplateSerialization {
        /// Field holding the template
        field: String,
        /// Description of the error
        message: String,
    },

    /// A filter failed
    #[error("filter '{filter}' failed: {message}")]
    FilterError {
        /// Name of the filter
        filter: String,
        /// Description of the error
        message: String,
    },

    /// Element model error
    #[error(transparent)]
    Api(#[from] salto_adapter_api::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
