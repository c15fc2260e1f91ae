use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::directory::DriverDirectory;
use crate::live::LiveStream;
use crate::models::order::Order;
use crate::notify::{Notifier, Outbox};
use crate::observability::metrics::Metrics;
use crate::orders::OrderStore;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub dispatch_queue_size: usize,
    pub subscriber_buffer_size: usize,
    pub notify_concurrency: usize,
    pub notify_backlog: usize,
    pub notify_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            dispatch_queue_size: 1024,
            subscriber_buffer_size: 64,
            notify_concurrency: 16,
            notify_backlog: 1024,
            notify_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for Limits {
    fn from(config: &Config) -> Self {
        Self {
            dispatch_queue_size: config.dispatch_queue_size,
            subscriber_buffer_size: config.subscriber_buffer_size,
            notify_concurrency: config.notify_concurrency,
            notify_backlog: config.notify_backlog,
            notify_timeout: Duration::from_millis(config.notify_timeout_ms),
        }
    }
}

pub struct AppState {
    pub drivers: DriverDirectory,
    pub orders: OrderStore,
    pub live: LiveStream,
    pub outbox: Outbox,
    pub dispatch_tx: mpsc::Sender<Order>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
        limits: Limits,
    ) -> (Self, mpsc::Receiver<Order>) {
        let metrics = Metrics::new();
        let (dispatch_tx, dispatch_rx) = mpsc::channel(limits.dispatch_queue_size.max(1));

        (
            Self {
                drivers: DriverDirectory::new(store.clone()),
                orders: OrderStore::new(store),
                live: LiveStream::new(limits.subscriber_buffer_size, metrics.clone()),
                outbox: Outbox::new(
                    notifier,
                    limits.notify_concurrency,
                    limits.notify_backlog,
                    limits.notify_timeout,
                    metrics.clone(),
                ),
                dispatch_tx,
                metrics,
            },
            dispatch_rx,
        )
    }
}
