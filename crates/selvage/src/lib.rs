//! selvage library - http handlers and application setup.
//!
//! this crate provides the http server for the selvage licensing and model
//! delivery backend:
//! - [`handlers`]: http request handlers for the api endpoints
//! - [`cli`]: command-line interface implementation
//! - [`cache`]: ttl cache in front of the license store
//! - [`license`]: license validation and activation service
//! - [`relay`]: per-key broadcast actors for real-time sessions
//! - [`sweep`]: periodic maintenance sweep

#![warn(missing_docs)]

/// ttl cache in front of the license store.
pub mod cache;
/// command-line interface implementation.
pub mod cli;
/// http request handlers for the api endpoints.
pub mod handlers;
/// license validation and activation service.
pub mod license;
/// per-key broadcast actors for real-time sessions.
pub mod relay;
/// periodic maintenance sweep.
pub mod sweep;

pub use cache::LicenseCache;
pub use license::LicenseService;
pub use relay::RelayRegistry;
pub use sweep::MaintenanceSweep;

use axum::{
    Router,
    routing::{get, post},
};
use selvage_db::SelvageDb;
use selvage_store::FsObjectStore;
use selvage_types::Config;
use tower_http::cors::CorsLayer;

/// shared state for the http handlers.
#[derive(Clone)]
pub struct AppState {
    /// database handle for persistent storage.
    pub db: SelvageDb,
    /// object store holding model blobs and pattern archives.
    pub store: FsObjectStore,
    /// license validation and activation service.
    pub licenses: LicenseService,
    /// registry of per-key broadcast actors.
    pub relay: RelayRegistry,
    /// server configuration.
    pub config: Config,
}

/// create the axum application with all routes.
///
/// every route answers cross-origin requests; the extension clients call
/// from arbitrary page origins.
pub fn create_app(
    db: SelvageDb,
    store: FsObjectStore,
    licenses: LicenseService,
    relay: RelayRegistry,
    config: Config,
) -> Router {
    let state = AppState {
        db,
        store,
        licenses,
        relay,
        config,
    };

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/licenses/validate", post(handlers::licenses::validate))
        .route("/licenses/activate", post(handlers::licenses::activate))
        .route("/models/available", get(handlers::models::available))
        .route("/models/download", post(handlers::models::download))
        .route(
            "/models/check-updates",
            post(handlers::models::check_updates),
        )
        .route("/sync/patterns", post(handlers::sync::patterns))
        .route("/reviews/verify", post(handlers::reviews::verify))
        .route("/ws", get(handlers::ws::handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
