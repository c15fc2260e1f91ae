use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::api::rest::ws;
use crate::engine::tracking::{lookup, TrackingView};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tracking/:tracking_number", get(get_tracking))
        .route("/tracking/:tracking_number/live", get(ws::live_handler))
}

async fn get_tracking(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackingView>, AppError> {
    Ok(Json(lookup(&state, &tracking_number)?))
}
