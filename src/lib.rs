//! Backend for the experiential-design agency's quote builder.
//!
//! The pricing engine (`pricing`) and the cart store (`quote`) are pure
//! library code; `build_router` wires them, plus the submission endpoints,
//! into an Axum application.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod pricing;
pub mod quote;
pub mod submissions;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};

use crate::cache::CartSessions;
use crate::config::Config;
use crate::pricing::{Catalog, PricingError};
use crate::quote::{JsonFilePersistence, QuotePersistence};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub carts: CartSessions,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, carts: CartSessions) -> Self {
        Self { catalog, carts }
    }

    /// Build state from configuration: load the catalog and file storage
    pub fn from_config(config: &Config) -> Result<Self, PricingError> {
        let catalog = match &config.pricing_catalog_path {
            Some(path) => {
                let catalog = Catalog::from_json_file(path)?;
                tracing::info!(
                    "Loaded pricing catalog from {} ({} services, {} add-ons)",
                    path.display(),
                    catalog.services.len(),
                    catalog.add_ons.len()
                );
                catalog
            }
            None => Catalog::builtin().clone(),
        };
        let catalog = Arc::new(catalog);

        let persistence: Arc<dyn QuotePersistence> =
            Arc::new(JsonFilePersistence::new(&config.quote_store_dir));
        let carts = CartSessions::new(
            catalog.clone(),
            persistence,
            config.cart_session_capacity,
            config.cart_session_ttl,
        );

        Ok(Self::new(catalog, carts))
    }
}

/// Full application router
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .merge(pricing::router())
        .merge(quote::router())
        .merge(submissions::router());
    with_middleware(routes).with_state(state)
}

/// Tracing, compression, CORS, and a 500 response for handlers that panic
pub fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(CatchPanicLayer::custom(error::panic_response)),
    )
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "cache": state.carts.stats(),
    }))
}
