pub mod tracking;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::bid::{Bid, NewBid};
use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::route::RoutePoint;
use crate::store::{Collection, DocumentStore, Documents, KeyedLocks};

#[derive(Debug, Clone)]
pub struct RouteAppend {
    pub order: Order,
    pub point: RoutePoint,
    pub previous_timestamp: Option<DateTime<Utc>>,
}

impl RouteAppend {
    pub fn is_out_of_order(&self) -> bool {
        self.previous_timestamp
            .is_some_and(|previous| self.point.timestamp < previous)
    }
}

pub struct OrderStore {
    orders: Documents<Order>,
    locks: KeyedLocks,
}

impl OrderStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            orders: Documents::new(store, Collection::Orders),
            locks: KeyedLocks::new(),
        }
    }

    pub fn create(&self, input: NewOrder) -> Result<Order, AppError> {
        require_text("from", &input.from)?;
        require_text("to", &input.to)?;
        require_text("vehicle_type_required", &input.vehicle_type_required)?;
        require_quantity("weight", input.weight)?;
        require_quantity("volume", input.volume)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            tracking_number: None,
            from: input.from.trim().to_string(),
            to: input.to.trim().to_string(),
            vehicle_type_required: input.vehicle_type_required.trim().to_string(),
            weight: input.weight,
            volume: input.volume,
            description: input.description.trim().to_string(),
            status: OrderStatus::Created,
            assigned_driver_id: None,
            final_price: None,
            bids: Vec::new(),
            route: Vec::new(),
            estimated_delivery: input.estimated_delivery,
            created_at: now,
            assigned_at: None,
            updated_at: now,
        };

        self.orders.put(&order.id.to_string(), &order)?;
        info!(order_id = %order.id, vehicle_type = %order.vehicle_type_required, "order created");
        Ok(order)
    }

    pub fn get(&self, order_id: Uuid) -> Result<Order, AppError> {
        self.orders
            .get(&order_id.to_string())?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))
    }

    pub fn get_by_tracking(&self, tracking_number: &str) -> Result<Order, AppError> {
        let not_found =
            || AppError::NotFound(format!("tracking number {tracking_number} not found"));

        let order_id = tracking::order_id_of(tracking_number).ok_or_else(not_found)?;
        let order = self.orders.get(&order_id.to_string())?.ok_or_else(not_found)?;

        match order.tracking_number.as_deref() {
            Some(stored) if stored == tracking_number => Ok(order),
            _ => Err(not_found()),
        }
    }

    /// All orders, newest first.
    pub fn list(&self) -> Result<Vec<Order>, AppError> {
        let mut orders = self.orders.list()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub fn add_bid(&self, order_id: Uuid, new: NewBid) -> Result<Bid, AppError> {
        require_text("driver_id", &new.driver_id)?;
        require_text("vehicle_number", &new.vehicle_number)?;
        if !new.price.is_finite() || new.price <= 0.0 {
            return Err(AppError::InvalidInput("price must be > 0".to_string()));
        }

        self.update(order_id, |order| {
            if order.status != OrderStatus::Created {
                return Err(AppError::InvalidState(format!(
                    "order {order_id} is {} and no longer accepts bids",
                    order.status
                )));
            }

            let bid = Bid {
                driver_id: new.driver_id.trim().to_string(),
                price: new.price,
                vehicle_number: new.vehicle_number.trim().to_string(),
                loading_date: new.loading_date,
                submitted_at: Utc::now(),
            };
            order.bids.push(bid.clone());
            Ok(bid)
        })
    }

    pub fn assign(&self, order_id: Uuid, driver_id: &str, price: f64) -> Result<Order, AppError> {
        require_text("driver_id", driver_id)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::InvalidInput("price must be > 0".to_string()));
        }

        self.update(order_id, |order| {
            if order.assigned_driver_id.is_some() {
                return Err(AppError::AlreadyAssigned { order_id });
            }
            if !order.status.can_transition_to(&OrderStatus::Assigned) {
                return Err(AppError::InvalidState(format!(
                    "order {order_id} is {} and cannot be assigned",
                    order.status
                )));
            }

            let now = Utc::now();
            order.assigned_driver_id = Some(driver_id.to_string());
            order.final_price = Some(price);
            order.status = OrderStatus::Assigned;
            order.tracking_number = Some(tracking::tracking_number(driver_id, order_id));
            order.assigned_at = Some(now);
            Ok(order.clone())
        })
    }

    // `committed` runs after the write while the order lock is still held
    pub fn append_route_point(
        &self,
        order_id: Uuid,
        driver_id: &str,
        point: RoutePoint,
        committed: impl FnOnce(&RouteAppend),
    ) -> Result<RouteAppend, AppError> {
        self.update_then(
            order_id,
            |order| {
                if order.assigned_driver_id.as_deref() != Some(driver_id) {
                    return Err(AppError::DriverNotAssigned {
                        order_id,
                        driver_id: driver_id.to_string(),
                    });
                }
                if !order.status.can_transition_to(&point.status) {
                    return Err(AppError::InvalidState(format!(
                        "order {order_id} is {} and cannot move to {}",
                        order.status, point.status
                    )));
                }

                let previous_timestamp = order.last_point().map(|last| last.timestamp);
                order.status = point.status.clone();
                order.route.push(point.clone());

                Ok(RouteAppend {
                    order: order.clone(),
                    point,
                    previous_timestamp,
                })
            },
            committed,
        )
    }

    fn update<T>(
        &self,
        order_id: Uuid,
        mutate: impl FnOnce(&mut Order) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        self.update_then(order_id, mutate, |_| ())
    }

    fn update_then<T>(
        &self,
        order_id: Uuid,
        mutate: impl FnOnce(&mut Order) -> Result<T, AppError>,
        committed: impl FnOnce(&T),
    ) -> Result<T, AppError> {
        let key = order_id.to_string();
        self.locks.with(&key, || {
            let mut order = self
                .orders
                .get(&key)?
                .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

            order.updated_at = Utc::now();
            let value = match mutate(&mut order) {
                Ok(value) => value,
                Err(err) => {
                    warn!(order_id = %order_id, error = %err, "order update rejected");
                    return Err(err);
                }
            };

            self.orders.put(&key, &order)?;
            committed(&value);
            Ok(value)
        })
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_quantity(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidInput(format!("{field} must be >= 0")));
    }
    Ok(())
}
