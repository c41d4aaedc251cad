//! Error types for the engine.

use thiserror::Error;

/// Errors that can occur while dispatching commands or deriving views.
///
/// Absence of telemetry is deliberately *not* an error: a new agent with no
/// samples yet, an empty process listing, or a pid without a snapshot entry
/// are all expected steady states and are modeled with `Option`/empty
/// collections instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure on the command channel.
    #[error("Command channel failed: {0}")]
    Channel(String),

    /// No reply from the agent within the dispatch bound.
    #[error("Command timed out")]
    Timeout,

    /// A dispatch reply failed to parse into the expected structure.
    #[error("Malformed {command} payload: {source}")]
    MalformedPayload {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The caller requested an action outside the supported set.
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// The caller requested a metric type outside the supported set.
    #[error("Unknown metric type: {0}")]
    UnknownMetric(String),

    /// A collaborator store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O failure reading file-backed data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure outside a dispatch payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
