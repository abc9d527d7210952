//! Live-push session for one viewer.
//!
//! The session only writes: hub payloads go out as text frames, and frames
//! coming from the viewer are ignored apart from ping/pong/close.

use super::{ConnectionRegistry, SubscriberId};
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web_actors::ws;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::Receiver;
use tokio_stream::wrappers::ReceiverStream;

pub struct ViewerSession {
    subscriber_id: SubscriberId,
    handle: String,
    registry: ConnectionRegistry,
    events: Option<Receiver<Arc<str>>>,
    hb: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
}

impl ViewerSession {
    pub fn new(
        subscriber_id: SubscriberId,
        handle: String,
        registry: ConnectionRegistry,
        events: Receiver<Arc<str>>,
        heartbeat_interval: Duration,
        client_timeout: Duration,
    ) -> Self {
        Self {
            subscriber_id,
            handle,
            registry,
            events: Some(events),
            hb: Instant::now(),
            heartbeat_interval,
            client_timeout,
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let client_timeout = self.client_timeout;
        ctx.run_interval(self.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.hb) > client_timeout {
                tracing::warn!(
                    subscriber_id = %act.subscriber_id,
                    handle = %act.handle,
                    "viewer heartbeat timed out, disconnecting"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for ViewerSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            subscriber_id = %self.subscriber_id,
            handle = %self.handle,
            "viewer session started"
        );

        self.hb(ctx);

        if let Some(events) = self.events.take() {
            ctx.add_stream(ReceiverStream::new(events));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            subscriber_id = %self.subscriber_id,
            handle = %self.handle,
            "viewer session stopped"
        );

        let registry = self.registry.clone();
        let subscriber_id = self.subscriber_id;

        actix::spawn(async move {
            registry.unregister(subscriber_id).await;
        });
    }
}

// Hub payloads
impl StreamHandler<Arc<str>> for ViewerSession {
    fn handle(&mut self, payload: Arc<str>, ctx: &mut Self::Context) {
        ctx.text(&*payload);
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // the hub dropped our sender: overflow or explicit unregister
        tracing::debug!(subscriber_id = %self.subscriber_id, "event stream ended, closing viewer");
        ctx.close(Some(ws::CloseCode::Away.into()));
        ctx.stop();
    }
}

// Viewer frames
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ViewerSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                tracing::debug!(subscriber_id = %self.subscriber_id, "ignoring viewer frame");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(subscriber_id = %self.subscriber_id, ?reason, "viewer closed connection");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::warn!(subscriber_id = %self.subscriber_id, error = %e, "websocket protocol error");
                ctx.stop();
            }
        }
    }
}
