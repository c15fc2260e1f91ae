use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::bidding::{assign_order, submit_bid};
use crate::engine::dispatch::{dispatch_order, BroadcastReport};
use crate::engine::ingest::ingest;
use crate::engine::queue::enqueue_order;
use crate::error::AppError;
use crate::models::bid::{Bid, NewBid};
use crate::models::order::{NewOrder, Order};
use crate::models::route::{RoutePoint, RoutePointInput};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/dispatch", post(redispatch_order))
        .route("/orders/:id/bids", post(create_bid))
        .route("/orders/:id/assign", post(assign))
        .route("/orders/:id/route", post(ingest_location))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub driver_id: String,
    pub price: f64,
}

#[derive(Deserialize)]
pub struct LocationRequest {
    pub driver_id: String,
    #[serde(flatten)]
    pub point: RoutePointInput,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewOrder>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders.create(payload)?;
    state.metrics.orders_created_total.inc();
    enqueue_order(&state, order.clone()).await?;

    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list()?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get(id)?))
}

async fn redispatch_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BroadcastReport>, AppError> {
    let order = state.orders.get(id)?;
    Ok(Json(dispatch_order(&state, &order)?))
}

async fn create_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewBid>,
) -> Result<Json<Bid>, AppError> {
    Ok(Json(submit_bid(&state, id, payload)?))
}

async fn assign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(assign_order(
        &state,
        id,
        &payload.driver_id,
        payload.price,
    )?))
}

async fn ingest_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LocationRequest>,
) -> Result<Json<RoutePoint>, AppError> {
    Ok(Json(ingest(&state, id, &payload.driver_id, payload.point)?))
}
