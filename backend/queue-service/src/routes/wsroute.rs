use crate::{state::AppState, websocket::session::ViewerSession};
use actix_middleware::Identity;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

/// GET /joinws
/// Upgrades to a websocket that receives every queue event
#[get("/joinws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    user: Identity,
) -> Result<HttpResponse, Error> {
    let (subscriber_id, events) = state.registry.register().await;

    let session = ViewerSession::new(
        subscriber_id,
        user.handle,
        state.registry.clone(),
        events,
        state.config.ws.heartbeat_interval,
        state.config.ws.client_timeout,
    );

    match ws::start(session, &req, stream) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            tracing::warn!(%subscriber_id, error = %e, "websocket handshake failed");
            state.registry.unregister(subscriber_id).await;
            Err(e)
        }
    }
}
