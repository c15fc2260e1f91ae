use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::OrderStatus;
use crate::models::route::{RoutePoint, RoutePointInput};
use crate::notify::Notification;
use crate::orders::RouteAppend;
use crate::state::AppState;

pub fn ingest(
    state: &AppState,
    order_id: Uuid,
    driver_id: &str,
    input: RoutePointInput,
) -> Result<RoutePoint, AppError> {
    let point = validate(input)?;
    let mut subscribers = 0;
    // publish under the order lock so subscribers see storage order and a
    // delivery cannot close the stream ahead of an earlier point
    let appended = state.orders.append_route_point(
        order_id,
        driver_id.trim(),
        point,
        |appended| {
            if let Some(tracking_number) = appended.order.tracking_number.as_deref() {
                subscribers = state.live.publish(tracking_number, &appended.point);
                if appended.order.status.is_terminal() {
                    state.live.close(tracking_number);
                }
            }
        },
    )?;

    state.metrics.route_points_total.inc();
    if appended.is_out_of_order() {
        state.metrics.route_points_out_of_order_total.inc();
        warn!(
            order_id = %order_id,
            timestamp = %appended.point.timestamp,
            previous = ?appended.previous_timestamp,
            "route point is older than the previous point; stored in arrival order"
        );
    }

    let RouteAppend { order, point, .. } = appended;
    info!(
        order_id = %order_id,
        tracking_number = ?order.tracking_number,
        status = %order.status,
        subscribers,
        "route point ingested"
    );

    let mut message = format!(
        "order {order_id}: {} at {} ({:.5}, {:.5})",
        point.status, point.location_label, point.lat, point.lng
    );
    if !point.description.is_empty() {
        message.push_str(&format!(". {}", point.description));
    }
    state
        .outbox
        .send(Notification::operations(order_id, message));

    Ok(point)
}

fn validate(input: RoutePointInput) -> Result<RoutePoint, AppError> {
    let lat = input
        .lat
        .ok_or_else(|| AppError::InvalidInput("lat is required".to_string()))?;
    let lng = input
        .lng
        .ok_or_else(|| AppError::InvalidInput("lng is required".to_string()))?;
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::InvalidInput(format!("lat {lat} is out of range")));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::InvalidInput(format!("lng {lng} is out of range")));
    }

    let location_label = input
        .location_label
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .ok_or_else(|| AppError::InvalidInput("location_label is required".to_string()))?;

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => OrderStatus::InTransit,
        Some(raw) => OrderStatus::parse(raw),
    };
    if !status.is_reportable() {
        return Err(AppError::InvalidInput(format!(
            "status {status} cannot be reported on a route point"
        )));
    }

    Ok(RoutePoint {
        lat,
        lng,
        location_label,
        status,
        description: input
            .description
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
        timestamp: input.timestamp.unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::error::AppError;
    use crate::models::order::OrderStatus;
    use crate::models::route::RoutePointInput;

    fn input() -> RoutePointInput {
        RoutePointInput {
            lat: Some(43.25),
            lng: Some(76.92),
            location_label: Some("Almaty".to_string()),
            ..RoutePointInput::default()
        }
    }

    #[test]
    fn missing_status_means_in_transit() {
        let point = validate(input()).unwrap();
        assert_eq!(point.status, OrderStatus::InTransit);
        assert_eq!(point.location_label, "Almaty");
    }

    #[test]
    fn custom_status_is_kept() {
        let mut raw = input();
        raw.status = Some("Customs check".to_string());
        assert_eq!(
            validate(raw).unwrap().status,
            OrderStatus::Custom("Customs check".to_string())
        );
    }

    #[test]
    fn required_fields_are_enforced() {
        let mut no_lat = input();
        no_lat.lat = None;
        assert!(matches!(validate(no_lat), Err(AppError::InvalidInput(_))));

        let mut blank_label = input();
        blank_label.location_label = Some("   ".to_string());
        assert!(matches!(validate(blank_label), Err(AppError::InvalidInput(_))));

        let mut off_globe = input();
        off_globe.lng = Some(181.0);
        assert!(matches!(validate(off_globe), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn pre_assignment_statuses_are_rejected() {
        for status in ["created", "Assigned"] {
            let mut raw = input();
            raw.status = Some(status.to_string());
            assert!(matches!(validate(raw), Err(AppError::InvalidInput(_))));
        }
    }
}
