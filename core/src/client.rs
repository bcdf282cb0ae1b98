//! Stateless HTTP request builder and response parser for the Thing API.
//!
//! # Design
//! `ThingClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//!
//! Parsing is binary: the one success status yields `Some`, every other
//! status yields `None`. Callers that need to tell a missing record from a
//! failing server have to look at the transport, not at this type.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Thing, ThingId};

const CREATED: u16 = 201;
const OK: u16 = 200;

/// Synchronous, stateless client for the Thing API.
#[derive(Debug, Clone)]
pub struct ThingClient {
    base_url: String,
}

impl ThingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_create(&self, thing: &Thing) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(thing).map_err(ApiError::Serialization)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/thing", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_get(&self, id: ThingId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/thing/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `201` decodes to the new id; anything else is `None`.
    pub fn parse_create(&self, response: HttpResponse) -> Result<Option<ThingId>, ApiError> {
        if response.status != CREATED {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(ApiError::Deserialization)
    }

    /// `200` decodes to the stored Thing; anything else (404 included) is `None`.
    pub fn parse_get(&self, response: HttpResponse) -> Result<Option<Thing>, ApiError> {
        if response.status != OK {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(ApiError::Deserialization)
    }
}
