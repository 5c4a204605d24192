//! Error types for the ketama crate.
//!
//! Ring operations themselves never fail: an empty ring answers lookups with
//! `None` and removing an unknown node is a no-op. Errors only come out of
//! loading a [`RingConfig`](crate::RingConfig).

use thiserror::Error;

/// Result type alias for the ketama crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a ring from configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration parsed but describes an unusable ring.
    #[error("invalid ring config: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("failed to parse ring config: {0}")]
    Json(#[from] serde_json::Error),
}
