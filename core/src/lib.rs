//! Client core for the Thing API.
//!
//! # Overview
//! Two operations against a remote Thing resource: create a record and
//! fetch one by id. `ThingClient` builds `HttpRequest` values and parses
//! `HttpResponse` values without touching the network; `HttpThingClient`
//! runs the same pair over `reqwest` for async callers.
//!
//! # Design
//! - The wire schema in [`types`] is shared with the server crate.
//! - Non-success statuses are absence (`Ok(None)`), not errors. Only
//!   transport and decoding faults surface as [`ApiError`].
//! - [`contract`] holds the consumer-driven contract model both crates
//!   verify themselves against.

pub mod client;
pub mod contract;
pub mod error;
pub mod http;
pub mod remote;
pub mod types;

pub use client::ThingClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use remote::{HttpThingClient, ThingApi};
pub use types::{Thing, ThingId};
