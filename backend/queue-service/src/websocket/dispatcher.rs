use super::{events::QueueEvent, ConnectionRegistry};
use crate::metrics::EVENTS_BROADCAST_TOTAL;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Drains the ordered event stream into the registry.
///
/// A single task does all fan-out, so viewers see events in the order the
/// mutations committed. Stops when every publisher is dropped.
pub fn start_event_dispatcher(
    mut events: UnboundedReceiver<QueueEvent>,
    registry: ConnectionRegistry,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let event_type = event.event_type();
            let delivered = registry.broadcast(&event).await;
            EVENTS_BROADCAST_TOTAL.with_label_values(&[event_type]).inc();

            tracing::debug!(event_type, delivered, "queue event broadcast");
        }

        tracing::info!("event stream closed, dispatcher stopping");
    })
}
