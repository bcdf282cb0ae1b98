//! HTTP boundary for the Thing resource.
//!
//! Two routes map onto [`ThingRepository`]: `POST /thing` stores a record
//! and answers `201 {"id": n}`; `GET /thing/{id}` answers `200` with the
//! record or `404` with an empty body. Bodies and path ids are decoded by
//! axum's extractors, so a malformed request is rejected before the store
//! sees it.

pub mod config;
pub mod repository;

use std::future::Future;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use thing_core::{Thing, ThingId};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use repository::ThingRepository;

pub fn app(repository: ThingRepository) -> Router {
    Router::new()
        .route("/thing", post(create_thing))
        .route("/thing/{id}", get(get_thing))
        .layer(TraceLayer::new_for_http())
        .with_state(repository)
}

/// Serve `repository` on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, repository: ThingRepository, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(repository))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn create_thing(
    State(repository): State<ThingRepository>,
    Json(thing): Json<Thing>,
) -> (StatusCode, Json<ThingId>) {
    let id = repository.save(thing).await;
    tracing::debug!(%id, "thing stored");
    (StatusCode::CREATED, Json(id))
}

async fn get_thing(
    State(repository): State<ThingRepository>,
    Path(id): Path<u64>,
) -> Result<Json<Thing>, StatusCode> {
    let thing = repository.get(ThingId::new(id)).await;
    if thing.is_none() {
        tracing::debug!(id, "thing not found");
    }
    thing.map(Json).ok_or(StatusCode::NOT_FOUND)
}
