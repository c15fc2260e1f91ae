use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bid {
    pub driver_id: String,
    pub price: f64,
    pub vehicle_number: String,
    pub loading_date: NaiveDate,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    pub driver_id: String,
    pub price: f64,
    pub vehicle_number: String,
    pub loading_date: NaiveDate,
}
