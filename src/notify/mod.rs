use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{info, warn};
use uuid::Uuid;

use crate::observability::metrics::Metrics;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Recipient {
    Driver(String),
    Operations,
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Driver(id) => write!(f, "driver:{id}"),
            Recipient::Operations => f.write_str("operations"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub order_id: Option<Uuid>,
    pub message: String,
}

impl Notification {
    pub fn driver(driver_id: &str, order_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Driver(driver_id.to_string()),
            order_id: Some(order_id),
            message: message.into(),
        }
    }

    pub fn operations(order_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Operations,
            order_id: Some(order_id),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            recipient = %notification.recipient,
            order_id = ?notification.order_id,
            message = %notification.message,
            "notification"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct Outbox {
    notifier: Arc<dyn Notifier>,
    permits: Arc<Semaphore>,
    backlog: Arc<Semaphore>,
    timeout: Duration,
    metrics: Metrics,
}

impl Outbox {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        concurrency: usize,
        backlog: usize,
        timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            notifier,
            permits: Arc::new(Semaphore::new(concurrency)),
            backlog: Arc::new(Semaphore::new(backlog.max(concurrency))),
            timeout,
            metrics,
        }
    }

    // Failures are logged and counted, never returned.
    pub fn send(&self, notification: Notification) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            self.dropped(&notification, "no async runtime on this thread");
            return None;
        };
        let Ok(slot) = self.backlog.clone().try_acquire_owned() else {
            self.dropped(&notification, "notification backlog is full");
            return None;
        };

        let notifier = self.notifier.clone();
        let permits = self.permits.clone();
        let timeout = self.timeout;
        let metrics = self.metrics.clone();

        Some(runtime.spawn(async move {
            let _slot = slot;
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            let failure = match time::timeout(timeout, notifier.deliver(&notification)).await {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(_) => Some(format!("timed out after {timeout:?}")),
            };
            match failure {
                None => {
                    metrics
                        .notifications_total
                        .with_label_values(&["delivered"])
                        .inc();
                }
                Some(error) => {
                    metrics
                        .notifications_total
                        .with_label_values(&["failed"])
                        .inc();
                    warn!(
                        recipient = %notification.recipient,
                        order_id = ?notification.order_id,
                        error = %error,
                        "notification dropped"
                    );
                }
            }
        }))
    }

    fn dropped(&self, notification: &Notification, reason: &str) {
        self.metrics
            .notifications_total
            .with_label_values(&["failed"])
            .inc();
        warn!(
            recipient = %notification.recipient,
            order_id = ?notification.order_id,
            reason,
            "notification dropped"
        );
    }
}
