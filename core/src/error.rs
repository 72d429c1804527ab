//! Error types for the Events Force client.
//!
//! # Design
//! Validation failures (`InvalidArgument`, `ScopeNotSet`) are raised before
//! any request is built, so they never have side effects. Transport failures
//! are wrapped without translation; a non-2xx status is not an error at this
//! layer and reaches the caller as an ordinary `HttpResponse`.

use std::convert::Infallible;

use thiserror::Error;

/// Errors returned by the client and the `Attendees` resource.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A caller-supplied value failed a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An event-scoped operation ran before an event id was set.
    #[error("no event id set; call set_event before using this resource")]
    ScopeNotSet,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Client configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<Infallible> for ApiError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl ApiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Error raised by the default ureq transport.
    #[error(transparent)]
    Ureq(#[from] ureq::Error),

    /// Error raised by a custom transport.
    #[error("transport failed: {0}")]
    Other(String),
}
