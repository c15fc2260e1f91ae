use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::order::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub location_label: String,
    pub status: OrderStatus,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

// optional so that a missing field is an InvalidInput, not a 422
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePointInput {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub location_label: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}
