//! Custom error types for routing and adapter operations

use thiserror::Error;

/// Failure reported by a single adapter invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// Backend rejected or failed the request
    #[error("Adapter failed: {message}")]
    Failed {
        message: String,
    },

    /// Adapter does not implement the requested capability
    #[error("Operation not supported: {operation}")]
    Unsupported {
        operation: &'static str,
    },

    /// Invocation exceeded its time budget
    #[error("Adapter timed out after {after_ms} ms")]
    Timeout {
        after_ms: u64,
    },

    /// Adapter code panicked
    #[error("Adapter panicked: {message}")]
    Panicked {
        message: String,
    },

    /// Adapter returned something the router cannot use
    #[error("Invalid response: {message}")]
    InvalidResponse {
        message: String,
    },
}

impl AdapterError {
    /// Shorthand for a plain failure
    pub fn failed(message: impl Into<String>) -> Self {
        AdapterError::Failed {
            message: message.into(),
        }
    }
}

/// Router-level errors returned to callers
#[derive(Error, Debug)]
pub enum RouterError {
    /// Text to translate or detect was empty
    #[error("Text must not be empty")]
    EmptyText,

    /// No adapter qualified for the call
    #[error("No translation adapters available")]
    NoAdaptersAvailable,

    /// Candidates existed but none was attempted
    #[error("No translation adapters were tried")]
    NoAdaptersTried,

    /// Last attempted adapter failed
    #[error("Adapter {adapter} failed: {source}")]
    Adapter {
        adapter: String,
        #[source]
        source: AdapterError,
    },

    /// Last attempted adapter lacks the capability
    #[error("Adapter {adapter} does not support {operation}")]
    UnsupportedOperation {
        adapter: String,
        operation: &'static str,
    },

    /// Cache encoding or decoding failed
    #[error("Cache error: {message}")]
    Cache {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl RouterError {
    /// Wrap the final failure of a fallback chain
    pub fn from_adapter(adapter: impl Into<String>, source: AdapterError) -> Self {
        match source {
            AdapterError::Unsupported { operation } => RouterError::UnsupportedOperation {
                adapter: adapter.into(),
                operation,
            },
            source => RouterError::Adapter {
                adapter: adapter.into(),
                source,
            },
        }
    }
}

impl From<anyhow::Error> for RouterError {
    fn from(err: anyhow::Error) -> Self {
        RouterError::Config {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        RouterError::Cache {
            message: err.to_string(),
        }
    }
}

/// Result type for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

/// Result type for a single adapter call
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;
