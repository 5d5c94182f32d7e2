//! Error types for the homerunner client.
//!
//! # Design
//! Non-200 responses from `/create` and `/destroy` keep the status code and
//! the raw body so test failures show what homerunner actually said. The
//! health probe only answers yes or no, so its failure carries no detail.
//! Transport failures pass through untouched.

use thiserror::Error;

use crate::transport::TransportError;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, HomerunnerError>;

/// Errors returned by `HomerunnerClient` parse methods and `Homerunner` calls.
#[derive(Debug, Error)]
pub enum HomerunnerError {
    /// `/create` or `/destroy` answered with a status other than 200.
    #[error("Encountered an error while processing a homerunner request: {status} {body}")]
    Request { status: u16, body: String },

    /// `/health` answered with a status other than 200.
    #[error("Homerunner did not respond with an OK response")]
    Unhealthy,

    /// The request payload could not be encoded as JSON.
    #[error("failed to encode homerunner request: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A 200 response body could not be decoded into the expected type.
    #[error("failed to decode homerunner response: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl HomerunnerError {
    /// Status code of a rejected request, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HomerunnerError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
