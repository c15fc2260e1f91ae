use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::bid::Bid;
use crate::models::route::RoutePoint;

// unknown statuses are kept verbatim and behave like an in-flight status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Created,
    Assigned,
    InTransit,
    Warehouse,
    Delayed,
    Delivered,
    Custom(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let key: String = trimmed
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "created" => OrderStatus::Created,
            "assigned" => OrderStatus::Assigned,
            "in_transit" => OrderStatus::InTransit,
            "warehouse" => OrderStatus::Warehouse,
            "delayed" => OrderStatus::Delayed,
            "delivered" => OrderStatus::Delivered,
            _ => OrderStatus::Custom(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Assigned => "assigned",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Warehouse => "warehouse",
            OrderStatus::Delayed => "delayed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Custom(label) => label,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    pub fn is_reportable(&self) -> bool {
        !matches!(self, OrderStatus::Created | OrderStatus::Assigned)
    }

    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        match self {
            OrderStatus::Delivered => false,
            OrderStatus::Created => matches!(next, OrderStatus::Assigned),
            _ => next.is_reportable(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        OrderStatus::parse(&raw)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub tracking_number: Option<String>,
    pub from: String,
    pub to: String,
    pub vehicle_type_required: String,
    pub weight: f64,
    pub volume: f64,
    pub description: String,
    pub status: OrderStatus,
    pub assigned_driver_id: Option<String>,
    pub final_price: Option<f64>,
    pub bids: Vec<Bid>,
    pub route: Vec<RoutePoint>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.id,
            from: self.from.clone(),
            to: self.to.clone(),
            vehicle_type_required: self.vehicle_type_required.clone(),
            weight: self.weight,
            volume: self.volume,
            description: self.description.clone(),
        }
    }

    pub fn last_point(&self) -> Option<&RoutePoint> {
        self.route.last()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub from: String,
    pub to: String,
    pub vehicle_type_required: String,
    pub weight: f64,
    pub volume: f64,
    pub description: String,
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "New order {}: {} -> {}, vehicle: {}, weight: {} t, volume: {} m3",
            self.order_id, self.from, self.to, self.vehicle_type_required, self.weight, self.volume
        )?;
        if !self.description.is_empty() {
            write!(f, ". {}", self.description)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub from: String,
    pub to: String,
    pub vehicle_type_required: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn fixed_statuses_parse_loosely() {
        assert_eq!(OrderStatus::parse("In Transit"), OrderStatus::InTransit);
        assert_eq!(OrderStatus::parse("in-transit"), OrderStatus::InTransit);
        assert_eq!(OrderStatus::parse(" DELIVERED "), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse("warehouse"), OrderStatus::Warehouse);
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = OrderStatus::parse("  Customs check  ");
        assert_eq!(status, OrderStatus::Custom("Customs check".to_string()));
        assert_eq!(status.as_str(), "Customs check");
        assert!(!status.is_terminal());
    }

    #[test]
    fn status_serializes_as_plain_string() {
        let json = serde_json::to_string(&OrderStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");

        let custom: OrderStatus = serde_json::from_str("\"На границе\"").unwrap();
        assert_eq!(custom, OrderStatus::Custom("На границе".to_string()));
    }

    #[test]
    fn delivered_is_the_only_terminal_state() {
        let delivered = OrderStatus::Delivered;
        assert!(!delivered.can_transition_to(&OrderStatus::InTransit));
        assert!(!delivered.can_transition_to(&OrderStatus::Custom("x".into())));

        for status in [
            OrderStatus::Assigned,
            OrderStatus::InTransit,
            OrderStatus::Warehouse,
            OrderStatus::Delayed,
            OrderStatus::Custom("border".into()),
        ] {
            assert!(!status.is_terminal());
            assert!(status.can_transition_to(&OrderStatus::Delivered));
            assert!(status.can_transition_to(&OrderStatus::Delayed));
        }
    }

    #[test]
    fn created_only_moves_to_assigned() {
        let created = OrderStatus::Created;
        assert!(created.can_transition_to(&OrderStatus::Assigned));
        assert!(!created.can_transition_to(&OrderStatus::InTransit));
        assert!(!OrderStatus::InTransit.can_transition_to(&OrderStatus::Created));
        assert!(!OrderStatus::Warehouse.can_transition_to(&OrderStatus::Assigned));
    }

    #[test]
    fn warehouse_and_transit_alternate() {
        assert!(OrderStatus::InTransit.can_transition_to(&OrderStatus::Warehouse));
        assert!(OrderStatus::Warehouse.can_transition_to(&OrderStatus::InTransit));
    }
}
