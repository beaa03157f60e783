//! HTTP routes for catalog lookup and ad-hoc estimates.

use axum::{extract::State, routing::get, routing::post, Json, Router};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::AppState;

use super::calculators::Estimate;
use super::catalog::Catalog;
use super::requests::EstimateRequest;
use super::services::{Pricer, ResolutionMode};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/catalog", get(catalog))
        .route("/api/pricing/estimate", post(estimate))
}

/// Full service and add-on catalog
async fn catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json((*state.catalog).clone())
}

/// Price a selection that is not held in a cart
async fn estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<Estimate>> {
    let mode = if request.strict {
        ResolutionMode::Strict
    } else {
        ResolutionMode::Lenient
    };

    // Add-ons are a set; repeated ids count once
    let add_ons: BTreeSet<&str> = request.add_ons.iter().map(String::as_str).collect();

    let estimate = Pricer::new(&state.catalog, mode).estimate(
        request
            .services
            .iter()
            .map(|s| (s.id.as_str(), &s.options)),
        add_ons,
        request.duration_days,
    )?;

    tracing::debug!(
        services = request.services.len(),
        total = estimate.total,
        "Computed ad-hoc estimate"
    );

    Ok(Json(estimate))
}
