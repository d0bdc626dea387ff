//! Error types for building the remote client.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up a client.
///
/// Failures of individual calls are reported as
/// [`roulette_core::ClientError`] through the collaborator trait.
#[derive(Debug, Error)]
pub enum Error {
    /// Base URL could not be parsed or cannot carry paths.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
