//! Async Remote Client: runs the sans-IO [`ThingClient`] over `reqwest`.
//!
//! Each call is one independent request/response exchange. There are no
//! retries and no timeout policy beyond what the supplied `reqwest::Client`
//! was built with. Dropping a pending future abandons only that exchange.

use async_trait::async_trait;
use reqwest::Method;

use crate::client::ThingClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Thing, ThingId};

/// Consumer-side view of the Thing resource.
///
/// `Ok(None)` means the server did not answer with the success status;
/// `Err` is reserved for exchanges that produced no usable response.
#[async_trait]
pub trait ThingApi: Send + Sync {
    async fn create(&self, thing: &Thing) -> Result<Option<ThingId>, ApiError>;

    async fn get(&self, id: ThingId) -> Result<Option<Thing>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpThingClient {
    client: ThingClient,
    http: reqwest::Client,
}

impl HttpThingClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            client: ThingClient::new(base_url),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut builder = self.http.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            status,
            "thing api exchange"
        );
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl ThingApi for HttpThingClient {
    async fn create(&self, thing: &Thing) -> Result<Option<ThingId>, ApiError> {
        let request = self.client.build_create(thing)?;
        let response = self.execute(request).await?;
        self.client.parse_create(response)
    }

    async fn get(&self, id: ThingId) -> Result<Option<Thing>, ApiError> {
        let request = self.client.build_get(id);
        let response = self.execute(request).await?;
        self.client.parse_get(response)
    }
}
