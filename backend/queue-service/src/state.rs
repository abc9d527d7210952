use crate::{config::Config, services::DiscussionService, websocket::ConnectionRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub discussion: Arc<DiscussionService>,
    pub registry: ConnectionRegistry,
    pub config: Arc<Config>,
}
