use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, TextEncoder};

pub static WS_CONNECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "queue_service_ws_connections",
        "Viewer connections currently registered with the broadcast hub",
    )
    .expect("failed to create queue_service_ws_connections");
    prometheus::default_registry()
        .register(Box::new(gauge.clone()))
        .expect("failed to register queue_service_ws_connections");
    gauge
});

pub static EVENTS_BROADCAST_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "queue_service_events_broadcast_total",
            "Queue events fanned out to viewers",
        ),
        &["type"],
    )
    .expect("failed to create queue_service_events_broadcast_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register queue_service_events_broadcast_total");
    counter
});

pub static WS_DROPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "queue_service_ws_dropped_total",
        "Viewer connections dropped because their buffer was full or closed",
    )
    .expect("failed to create queue_service_ws_dropped_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register queue_service_ws_dropped_total");
    counter
});

/// GET /metrics
pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
