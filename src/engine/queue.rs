use crate::error::AppError;
use crate::models::order::Order;
use crate::state::AppState;

pub async fn enqueue_order(state: &AppState, order: Order) -> Result<(), AppError> {
    state
        .dispatch_tx
        .send(order)
        .await
        .map_err(|err| AppError::Internal(format!("dispatch queue send failed: {err}")))?;

    state.metrics.dispatch_queue_depth.inc();
    Ok(())
}
