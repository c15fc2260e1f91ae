use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::live::Subscription;
use crate::models::order::OrderStatus;
use crate::models::route::RoutePoint;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct TrackingView {
    pub tracking_number: String,
    pub status: OrderStatus,
    pub route: Vec<RoutePoint>,
    pub assigned_driver_id: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

pub fn lookup(state: &AppState, tracking_number: &str) -> Result<TrackingView, AppError> {
    let order = state.orders.get_by_tracking(tracking_number)?;

    Ok(TrackingView {
        tracking_number: tracking_number.to_string(),
        status: order.status,
        route: order.route,
        assigned_driver_id: order.assigned_driver_id,
        estimated_delivery: order.estimated_delivery,
    })
}

/// Only points ingested after this call are delivered; history comes from
/// [`lookup`].
pub fn subscribe(state: &AppState, tracking_number: &str) -> Result<Subscription, AppError> {
    state.orders.get_by_tracking(tracking_number)?;

    // Attach before re-reading the status: a delivery committed in between
    // either closes this subscriber or is seen by the re-read.
    let mut subscription = state.live.subscribe(tracking_number);
    let order = state.orders.get_by_tracking(tracking_number)?;
    if order.status.is_terminal() {
        subscription.close();
    }

    Ok(subscription)
}
