pub mod capability;

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus, DriverUpdate, NewDriver};
use crate::phone;
use crate::store::{Collection, DocumentStore, Documents, KeyedLocks};

pub struct DriverDirectory {
    drivers: Documents<Driver>,
    locks: KeyedLocks,
}

impl DriverDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            drivers: Documents::new(store, Collection::Drivers),
            locks: KeyedLocks::new(),
        }
    }

    pub fn register(&self, new: NewDriver) -> Result<Driver, AppError> {
        let id = new.id.trim().to_string();
        require_id(&id)?;
        require_text("name", &new.name)?;
        require_text("vehicle_type", &new.vehicle_type)?;
        require_phone(&new.phone)?;

        self.locks.with(&id, || {
            if self.drivers.get(&id)?.is_some() {
                return Err(AppError::DuplicateId(format!("driver {id} already registered")));
            }

            let now = Utc::now();
            let phone = phone::canonical(&new.phone);
            let driver = Driver {
                id: id.clone(),
                name: new.name.trim().to_string(),
                phone_variants: phone::variants(&phone),
                phone,
                vehicle_type: new.vehicle_type.trim().to_string(),
                status: new.status,
                rating: clamp_rating(new.rating),
                registered_at: now,
                updated_at: now,
            };

            self.drivers.put(&id, &driver)?;
            info!(driver_id = %id, vehicle_type = %driver.vehicle_type, "driver registered");
            Ok(driver)
        })
    }

    pub fn get(&self, id: &str) -> Result<Driver, AppError> {
        self.drivers
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))
    }

    pub fn list(&self) -> Result<Vec<Driver>, AppError> {
        let mut drivers = self.drivers.list()?;
        drivers.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(drivers)
    }

    pub fn find_by_phone(&self, input: &str) -> Result<Driver, AppError> {
        let candidate = phone::variants(input);
        self.list()?
            .into_iter()
            .find(|driver| phone::matches(&candidate, &driver.phone, &driver.phone_variants))
            .ok_or_else(|| AppError::NotFound("no driver registered for this phone".to_string()))
    }

    // an unknown phone is an authentication failure, not a lookup miss
    pub fn identify(&self, input: &str) -> Result<Driver, AppError> {
        match self.find_by_phone(input) {
            Ok(driver) => Ok(driver),
            Err(AppError::NotFound(_)) => Err(AppError::Unauthorized),
            Err(err) => Err(err),
        }
    }

    pub fn find_by_capability(
        &self,
        vehicle_type: &str,
        only_active: bool,
    ) -> Result<Vec<Driver>, AppError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|driver| !only_active || driver.is_active())
            .filter(|driver| capability::is_capable(&driver.vehicle_type, vehicle_type))
            .collect())
    }

    pub fn set_status(&self, id: &str, status: DriverStatus) -> Result<Driver, AppError> {
        self.locks.with(id, || {
            let mut driver = self.get(id)?;
            if driver.status == status {
                return Ok(driver);
            }

            driver.status = status;
            driver.updated_at = Utc::now();
            self.drivers.put(id, &driver)?;
            info!(driver_id = %id, status = ?status, "driver status changed");
            Ok(driver)
        })
    }

    pub fn update(&self, id: &str, update: DriverUpdate) -> Result<Driver, AppError> {
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        if let Some(vehicle_type) = &update.vehicle_type {
            require_text("vehicle_type", vehicle_type)?;
        }
        if let Some(raw) = &update.phone {
            require_phone(raw)?;
        }

        self.locks.with(id, || {
            let mut driver = self.get(id)?;

            if let Some(name) = update.name {
                driver.name = name.trim().to_string();
            }
            if let Some(vehicle_type) = update.vehicle_type {
                driver.vehicle_type = vehicle_type.trim().to_string();
            }
            if let Some(rating) = update.rating {
                driver.rating = clamp_rating(rating);
            }
            if let Some(raw) = update.phone {
                driver.phone = phone::canonical(&raw);
                driver.phone_variants = phone::variants(&driver.phone);
            }

            driver.updated_at = Utc::now();
            self.drivers.put(id, &driver)?;
            Ok(driver)
        })
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}

// driver ids end up in tracking numbers, which travel as a URL path segment
fn require_id(id: &str) -> Result<(), AppError> {
    require_text("id", id)?;
    let url_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~');
    if !id.chars().all(url_safe) {
        return Err(AppError::InvalidInput(format!(
            "id {id:?} may only contain letters, digits, '-', '_', '.' and '~'"
        )));
    }
    Ok(())
}

fn require_phone(raw: &str) -> Result<(), AppError> {
    if phone::digits_of(raw).is_empty() {
        return Err(AppError::InvalidInput(
            "phone must contain digits".to_string(),
        ));
    }
    Ok(())
}

fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, 5.0)
    } else {
        0.0
    }
}
