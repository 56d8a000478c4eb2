//! Error types for salto-adapter-api

use thiserror::Error;

/// Result type alias for salto-adapter-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or manipulating elements
#[derive(Error, Debug)]
pub enum Error {
    /// An element ID full name could not be parsed
    #[error("invalid element ID '{full_name}': {message}")]
    InvalidElemId {
        /// The full name that failed to parse
        full_name: String,
        /// Description of the problem
        message: String,
    },

    /// A change was requested with neither a before nor an after value
    #[error("a change must have a before or an after value")]
    EmptyChange,

    /// A dotted value path walked into something that is not a map
    #[error("cannot set '{path}': '{segment}' is not a map")]
    InvalidPath {
        /// Full dotted path
        path: String,
        /// Segment where the walk stopped
        segment: String,
    },

    /// A restriction annotation holds a malformed regex
    #[error("invalid restriction regex '{pattern}': {source}")]
    InvalidRestriction {
        /// The offending pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A JSON document does not describe a valid value
    #[error("invalid value: {message}")]
    InvalidValue {
        /// Description of the problem
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
