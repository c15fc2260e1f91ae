use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::Stream;
use tracing::{debug, warn};

use crate::models::route::RoutePoint;
use crate::observability::metrics::Metrics;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<RoutePoint>,
}

struct Channels {
    by_tracking: DashMap<String, Vec<Subscriber>>,
    next_id: AtomicU64,
    buffer: usize,
    metrics: Metrics,
}

impl Channels {
    fn detach(&self, tracking_number: &str, id: u64) -> bool {
        let removed = match self.by_tracking.get_mut(tracking_number) {
            Some(mut subscribers) => {
                let before = subscribers.len();
                subscribers.retain(|sub| sub.id != id);
                before != subscribers.len()
            }
            None => false,
        };
        self.by_tracking
            .remove_if(tracking_number, |_, subscribers| subscribers.is_empty());

        if removed {
            self.disconnected("unsubscribed", 1);
        }
        removed
    }

    fn disconnected(&self, reason: &str, count: usize) {
        if count == 0 {
            return;
        }
        self.metrics.live_subscribers.sub(count as i64);
        self.metrics
            .live_disconnects_total
            .with_label_values(&[reason])
            .inc_by(count as u64);
    }
}

#[derive(Clone)]
pub struct LiveStream {
    channels: Arc<Channels>,
}

impl LiveStream {
    pub fn new(buffer: usize, metrics: Metrics) -> Self {
        Self {
            channels: Arc::new(Channels {
                by_tracking: DashMap::new(),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
                metrics,
            }),
        }
    }

    pub fn subscribe(&self, tracking_number: &str) -> Subscription {
        let id = self.channels.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.channels.buffer);

        self.channels
            .by_tracking
            .entry(tracking_number.to_string())
            .or_default()
            .push(Subscriber { id, tx });
        self.channels.metrics.live_subscribers.inc();
        debug!(tracking_number, subscriber = id, "live subscriber attached");

        Subscription {
            tracking_number: tracking_number.to_string(),
            id,
            rx,
            channels: Arc::downgrade(&self.channels),
        }
    }

    // never waits: a subscriber with a full queue is dropped instead
    pub fn publish(&self, tracking_number: &str, point: &RoutePoint) -> usize {
        let mut delivered = 0;
        let mut lagging = 0;
        let mut gone = 0;

        if let Some(mut subscribers) = self.channels.by_tracking.get_mut(tracking_number) {
            subscribers.retain(|sub| match sub.tx.try_send(point.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!(
                        tracking_number,
                        subscriber = sub.id,
                        "live subscriber is not keeping up; disconnecting"
                    );
                    lagging += 1;
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    gone += 1;
                    false
                }
            });
        }
        self.channels
            .by_tracking
            .remove_if(tracking_number, |_, subscribers| subscribers.is_empty());

        self.channels.disconnected("lagging", lagging);
        self.channels.disconnected("closed", gone);
        delivered
    }

    pub fn close(&self, tracking_number: &str) -> usize {
        let closed = self
            .channels
            .by_tracking
            .remove(tracking_number)
            .map(|(_, subscribers)| subscribers.len())
            .unwrap_or(0);

        self.channels.disconnected("order_closed", closed);
        closed
    }

    pub fn subscriber_count(&self, tracking_number: &str) -> usize {
        self.channels
            .by_tracking
            .get(tracking_number)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }
}

pub struct Subscription {
    tracking_number: String,
    id: u64,
    rx: mpsc::Receiver<RoutePoint>,
    channels: Weak<Channels>,
}

impl Subscription {
    pub fn tracking_number(&self) -> &str {
        &self.tracking_number
    }

    pub async fn recv(&mut self) -> Option<RoutePoint> {
        self.rx.recv().await
    }

    pub fn close(&mut self) {
        if let Some(channels) = self.channels.upgrade() {
            channels.detach(&self.tracking_number, self.id);
        }
    }
}

impl Stream for Subscription {
    type Item = RoutePoint;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
