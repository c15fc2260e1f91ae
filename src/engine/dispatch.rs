use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::notify::Notification;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub order_id: Uuid,
    pub matched_driver_count: usize,
    pub matched_driver_ids: Vec<String>,
}

pub async fn run_dispatch_engine(state: Arc<AppState>, mut order_rx: mpsc::Receiver<Order>) {
    info!("dispatch engine started");

    while let Some(order) = order_rx.recv().await {
        state.metrics.dispatch_queue_depth.dec();

        let start = Instant::now();
        let outcome = match dispatch_order(&state, &order) {
            Ok(_) => "success",
            Err(err) => {
                error!(order_id = %order.id, error = %err, "failed to broadcast order");
                "error"
            }
        };

        state
            .metrics
            .dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
    }

    warn!("dispatch engine stopped: queue channel closed");
}

/// Tells every active, capable driver about `order`. Delivery failures never
/// fail the broadcast.
pub fn dispatch_order(state: &AppState, order: &Order) -> Result<BroadcastReport, AppError> {
    let current = state.orders.get(order.id)?;
    if current.status != OrderStatus::Created {
        return Err(AppError::InvalidState(format!(
            "order {} is {} and is no longer open for bids",
            current.id, current.status
        )));
    }

    let matched = state
        .drivers
        .find_by_capability(&current.vehicle_type_required, true)?;

    let summary = current.summary().to_string();
    for driver in &matched {
        state
            .outbox
            .send(Notification::driver(&driver.id, current.id, summary.clone()));
    }

    let report = BroadcastReport {
        order_id: current.id,
        matched_driver_count: matched.len(),
        matched_driver_ids: matched.into_iter().map(|driver| driver.id).collect(),
    };

    state.outbox.send(Notification::operations(
        current.id,
        format!(
            "order {} ({} -> {}, {}) broadcast to {} drivers",
            current.id,
            current.from,
            current.to,
            current.vehicle_type_required,
            report.matched_driver_count
        ),
    ));

    state
        .metrics
        .dispatch_matched_drivers
        .observe(report.matched_driver_count as f64);

    if report.matched_driver_count == 0 {
        warn!(order_id = %current.id, vehicle_type = %current.vehicle_type_required, "no capable drivers for order");
    } else {
        info!(
            order_id = %current.id,
            matched = report.matched_driver_count,
            "order broadcast"
        );
    }

    Ok(report)
}
