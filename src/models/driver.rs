use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub phone_variants: BTreeSet<String>,
    pub vehicle_type: String,
    pub status: DriverStatus,
    pub rating: f64,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    pub fn is_active(&self) -> bool {
        self.status == DriverStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDriver {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub vehicle_type: String,
    #[serde(default = "default_status")]
    pub status: DriverStatus,
    #[serde(default)]
    pub rating: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle_type: Option<String>,
    pub rating: Option<f64>,
}

fn default_status() -> DriverStatus {
    DriverStatus::Active
}
