use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus, DriverUpdate, NewDriver};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(register_driver).get(list_drivers))
        .route("/drivers/identify", post(identify_driver))
        .route("/drivers/:id", get(get_driver).patch(update_driver))
        .route("/drivers/:id/status", patch(update_driver_status))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DriverStatus,
}

#[derive(Deserialize)]
pub struct IdentifyRequest {
    pub phone: String,
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDriver>,
) -> Result<Json<Driver>, AppError> {
    let driver = state.drivers.register(payload)?;
    Ok(Json(driver))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Driver>>, AppError> {
    Ok(Json(state.drivers.list()?))
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.drivers.get(&id)?))
}

async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DriverUpdate>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.drivers.update(&id, payload)?))
}

async fn update_driver_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.drivers.set_status(&id, payload.status)?))
}

async fn identify_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.drivers.identify(&payload.phone)?))
}
