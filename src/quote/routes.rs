//! Cart session route handlers
//!
//! Each handler maps onto one `QuoteStore` operation and answers with the
//! cart's current state and estimate. Mutations write through the storage
//! adapter, so they run on the blocking pool.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{run_blocking, SharedStore};
use crate::error::{AppError, Result};
use crate::pricing::{Estimate, OptionValue};
use crate::AppState;

use super::models::{EventDetailsPatch, QuoteState};
use super::store::QuoteStore;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", post(create_cart))
        .route("/api/cart/:session_id", get(get_cart).delete(reset_cart))
        .route("/api/cart/:session_id/estimate", get(get_estimate))
        .route("/api/cart/:session_id/services", post(add_service))
        .route(
            "/api/cart/:session_id/services/:instance_id",
            delete(remove_service),
        )
        .route(
            "/api/cart/:session_id/services/:instance_id/options",
            patch(update_service_option),
        )
        .route("/api/cart/:session_id/event", patch(update_event_details))
        .route("/api/cart/:session_id/add-ons/:add_on_id", post(toggle_add_on))
}

/// Cart snapshot returned by every cart endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub session_id: Uuid,
    pub state: QuoteState,
    pub estimate: Estimate,
}

impl CartResponse {
    fn snapshot(session_id: Uuid, store: &QuoteStore) -> Self {
        Self {
            session_id,
            state: store.state().clone(),
            estimate: store.estimate(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddServiceRequest {
    pub service_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptionRequest {
    pub option_id: String,
    pub value: OptionValue,
}

async fn session(state: &AppState, session_id: Uuid) -> Result<SharedStore> {
    state
        .carts
        .get(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart session {}", session_id)))
}

/// Apply `op` to the session's store and snapshot the result
async fn mutate<F>(state: &AppState, session_id: Uuid, op: F) -> Result<Json<CartResponse>>
where
    F: FnOnce(&mut QuoteStore) + Send + 'static,
{
    let shared = session(state, session_id).await?;
    let snapshot = run_blocking(move || {
        let mut store = shared.blocking_lock();
        op(&mut store);
        CartResponse::snapshot(session_id, &store)
    })
    .await?;
    Ok(Json(snapshot))
}

async fn create_cart(State(state): State<AppState>) -> Result<(StatusCode, Json<CartResponse>)> {
    let (session_id, store) = state.carts.create().await?;
    let store = store.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(CartResponse::snapshot(session_id, &store)),
    ))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CartResponse>> {
    let shared = session(&state, session_id).await?;
    let store = shared.lock().await;
    Ok(Json(CartResponse::snapshot(session_id, &store)))
}

async fn get_estimate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Estimate>> {
    let shared = session(&state, session_id).await?;
    let store = shared.lock().await;
    Ok(Json(store.estimate()))
}

async fn reset_cart(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CartResponse>> {
    let response = mutate(&state, session_id, QuoteStore::reset).await?;
    tracing::info!("Reset cart session {}", session_id);
    Ok(response)
}

async fn add_service(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AddServiceRequest>,
) -> Result<Json<CartResponse>> {
    mutate(&state, session_id, move |store| {
        store.add_service(&request.service_key);
    })
    .await
}

async fn remove_service(
    State(state): State<AppState>,
    Path((session_id, instance_id)): Path<(Uuid, String)>,
) -> Result<Json<CartResponse>> {
    mutate(&state, session_id, move |store| {
        store.remove_service(&instance_id);
    })
    .await
}

async fn update_service_option(
    State(state): State<AppState>,
    Path((session_id, instance_id)): Path<(Uuid, String)>,
    Json(request): Json<UpdateOptionRequest>,
) -> Result<Json<CartResponse>> {
    mutate(&state, session_id, move |store| {
        store.update_service_option(&instance_id, &request.option_id, request.value);
    })
    .await
}

async fn update_event_details(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(changes): Json<EventDetailsPatch>,
) -> Result<Json<CartResponse>> {
    mutate(&state, session_id, move |store| store.update_event_details(changes)).await
}

async fn toggle_add_on(
    State(state): State<AppState>,
    Path((session_id, add_on_id)): Path<(Uuid, String)>,
) -> Result<Json<CartResponse>> {
    mutate(&state, session_id, move |store| {
        store.toggle_add_on(&add_on_id);
    })
    .await
}
