use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub dispatch_queue_depth: IntGauge,
    pub dispatch_latency_seconds: HistogramVec,
    pub dispatch_matched_drivers: Histogram,
    pub assignments_total: IntCounterVec,
    pub route_points_total: IntCounter,
    pub route_points_out_of_order_total: IntCounter,
    pub notifications_total: IntCounterVec,
    pub live_subscribers: IntGauge,
    pub live_disconnects_total: IntCounterVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders created")
                .expect("valid orders_created_total metric");

        let dispatch_queue_depth = IntGauge::new(
            "dispatch_queue_depth",
            "Current number of orders waiting to be broadcast",
        )
        .expect("valid dispatch_queue_depth metric");

        let dispatch_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of order broadcast in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let dispatch_matched_drivers = Histogram::with_opts(
            HistogramOpts::new(
                "dispatch_matched_drivers",
                "Number of drivers matched per broadcast",
            )
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        )
        .expect("valid dispatch_matched_drivers metric");

        let assignments_total = IntCounterVec::new(
            Opts::new("assignments_total", "Total assignment attempts by outcome"),
            &["outcome"],
        )
        .expect("valid assignments_total metric");

        let route_points_total =
            IntCounter::new("route_points_total", "Total route points ingested")
                .expect("valid route_points_total metric");

        let route_points_out_of_order_total = IntCounter::new(
            "route_points_out_of_order_total",
            "Route points stored with a timestamp earlier than the previous point",
        )
        .expect("valid route_points_out_of_order_total metric");

        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Notification deliveries by outcome"),
            &["outcome"],
        )
        .expect("valid notifications_total metric");

        let live_subscribers = IntGauge::new(
            "live_subscribers",
            "Current number of live tracking subscribers",
        )
        .expect("valid live_subscribers metric");

        let live_disconnects_total = IntCounterVec::new(
            Opts::new(
                "live_disconnects_total",
                "Live tracking subscribers removed by reason",
            ),
            &["reason"],
        )
        .expect("valid live_disconnects_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(dispatch_queue_depth.clone()))
            .expect("register dispatch_queue_depth");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(dispatch_matched_drivers.clone()))
            .expect("register dispatch_matched_drivers");
        registry
            .register(Box::new(assignments_total.clone()))
            .expect("register assignments_total");
        registry
            .register(Box::new(route_points_total.clone()))
            .expect("register route_points_total");
        registry
            .register(Box::new(route_points_out_of_order_total.clone()))
            .expect("register route_points_out_of_order_total");
        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(live_subscribers.clone()))
            .expect("register live_subscribers");
        registry
            .register(Box::new(live_disconnects_total.clone()))
            .expect("register live_disconnects_total");

        Self {
            registry,
            orders_created_total,
            dispatch_queue_depth,
            dispatch_latency_seconds,
            dispatch_matched_drivers,
            assignments_total,
            route_points_total,
            route_points_out_of_order_total,
            notifications_total,
            live_subscribers,
            live_disconnects_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
