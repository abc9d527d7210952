use crate::metrics::{WS_CONNECTIONS, WS_DROPPED_TOTAL};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{channel, error::TrySendError, Receiver, Sender},
    RwLock,
};
use uuid::Uuid;

pub mod dispatcher;
pub mod events;
pub mod session;

pub use dispatcher::start_event_dispatcher;
pub use events::{event_channel, EventPublisher, QueueEvent};

/// Default per-connection outbound buffer, in events
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Unique identifier for a viewer connection
///
/// Handed out on registration and used for precise cleanup when the
/// connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a viewer connection.
///
/// `Open -> Closing` happens on a failed enqueue or a detected remote
/// disconnect; `Closing -> Closed` follows immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closing,
    Closed,
}

struct Subscriber {
    sender: Sender<Arc<str>>,
    state: ConnectionState,
}

/// Registry of live viewer connections
///
/// Guarded by its own lock, independent of the queue tree. Every
/// connection gets a fixed-capacity buffer; a connection that cannot take
/// the next event is dropped instead of slowing the broadcast.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<SubscriberId, Subscriber>>>,
    capacity: usize,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl ConnectionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Registers a viewer and returns the receiving end of its buffer.
    pub async fn register(&self) -> (SubscriberId, Receiver<Arc<str>>) {
        let (tx, rx) = channel(self.capacity);
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard.insert(
            subscriber_id,
            Subscriber {
                sender: tx,
                state: ConnectionState::Open,
            },
        );
        WS_CONNECTIONS.inc();

        tracing::debug!(
            %subscriber_id,
            total = guard.len(),
            "viewer registered"
        );

        (subscriber_id, rx)
    }

    /// Removes a viewer. Safe to call more than once.
    ///
    /// Dropping the sender ends the viewer's receive stream, which closes
    /// its session.
    pub async fn unregister(&self, subscriber_id: SubscriberId) -> bool {
        let mut guard = self.inner.write().await;
        let removed = guard.remove(&subscriber_id).is_some();

        if removed {
            WS_CONNECTIONS.dec();
            tracing::debug!(%subscriber_id, remaining = guard.len(), "viewer unregistered");
        }

        removed
    }

    /// Serializes `event` once and offers it to every open connection.
    ///
    /// Returns how many connections accepted it. Full or closed buffers are
    /// dropped from the registry; nothing here waits on a viewer.
    pub async fn broadcast(&self, event: &QueueEvent) -> usize {
        let payload: Arc<str> = match event.to_payload() {
            Ok(payload) => payload.into(),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_type = event.event_type(),
                    "failed to serialize queue event"
                );
                return 0;
            }
        };

        self.broadcast_payload(payload).await
    }

    pub async fn broadcast_payload(&self, payload: Arc<str>) -> usize {
        let mut guard = self.inner.write().await;
        let mut delivered = 0;

        for (subscriber_id, subscriber) in guard.iter_mut() {
            match subscriber.sender.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(%subscriber_id, "viewer buffer full, dropping connection");
                    subscriber.state = ConnectionState::Closing;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(%subscriber_id, "viewer already gone, dropping connection");
                    subscriber.state = ConnectionState::Closing;
                }
            }
        }

        let before = guard.len();
        guard.retain(|_, subscriber| subscriber.state == ConnectionState::Open);
        let dropped = before - guard.len();

        if dropped > 0 {
            WS_CONNECTIONS.sub(dropped as i64);
            WS_DROPPED_TOTAL.inc_by(dropped as u64);
            tracing::debug!(dropped, active = guard.len(), "dead viewers cleaned up");
        }

        delivered
    }

    /// `Open` while registered; `Closed` once removed or never known.
    pub async fn state(&self, subscriber_id: SubscriberId) -> ConnectionState {
        let guard = self.inner.read().await;
        guard
            .get(&subscriber_id)
            .map(|subscriber| subscriber.state)
            .unwrap_or(ConnectionState::Closed)
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops every connection; each session then closes its socket.
    pub async fn close_all(&self) -> usize {
        let mut guard = self.inner.write().await;
        let closed = guard.len();
        guard.clear();

        WS_CONNECTIONS.sub(closed as i64);
        tracing::info!(closed, "all viewers disconnected");

        closed
    }
}
