//! Error types for the Thing API client.
//!
//! # Design
//! Only faults outside the status contract are errors. A `404` or any other
//! non-success status is an ordinary "absent" outcome and never shows up
//! here; see [`ThingClient`](crate::ThingClient).
//!
//! Messages name the failing step only; the underlying error is the
//! `source()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed")]
    Serialization(#[source] serde_json::Error),

    /// A success response carried a body that does not match the schema.
    #[error("deserialization failed")]
    Deserialization(#[source] serde_json::Error),

    /// The exchange never produced a response (connection refused, reset,
    /// unreadable body).
    #[error("transport failed")]
    Transport(#[from] reqwest::Error),
}
