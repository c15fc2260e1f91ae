use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::bid::{Bid, NewBid};
use crate::models::order::Order;
use crate::notify::Notification;
use crate::state::AppState;

pub fn submit_bid(state: &AppState, order_id: Uuid, new: NewBid) -> Result<Bid, AppError> {
    state.drivers.get(new.driver_id.trim())?;
    let bid = state.orders.add_bid(order_id, new)?;

    info!(order_id = %order_id, driver_id = %bid.driver_id, price = bid.price, "bid received");
    state.outbox.send(Notification::operations(
        order_id,
        format!(
            "bid on order {order_id}: driver {} offers {} (vehicle {}, loading {})",
            bid.driver_id, bid.price, bid.vehicle_number, bid.loading_date
        ),
    ));

    Ok(bid)
}

pub fn assign_order(
    state: &AppState,
    order_id: Uuid,
    driver_id: &str,
    price: f64,
) -> Result<Order, AppError> {
    let driver_id = driver_id.trim();
    state.drivers.get(driver_id)?;

    let order = match state.orders.assign(order_id, driver_id, price) {
        Ok(order) => order,
        Err(err) => {
            let outcome = match &err {
                AppError::AlreadyAssigned { .. } => "already_assigned",
                _ => "rejected",
            };
            state
                .metrics
                .assignments_total
                .with_label_values(&[outcome])
                .inc();
            return Err(err);
        }
    };

    state
        .metrics
        .assignments_total
        .with_label_values(&["success"])
        .inc();

    let tracking_number = order.tracking_number.clone().unwrap_or_default();
    info!(
        order_id = %order.id,
        driver_id,
        tracking_number = %tracking_number,
        "order assigned"
    );

    state.outbox.send(Notification::driver(
        driver_id,
        order.id,
        format!(
            "You have been assigned order {} ({} -> {}) at {}. Tracking number: {tracking_number}",
            order.id,
            order.from,
            order.to,
            price
        ),
    ));
    state.outbox.send(Notification::operations(
        order.id,
        format!("order {} assigned to driver {driver_id} at {price}", order.id),
    ));

    Ok(order)
}
