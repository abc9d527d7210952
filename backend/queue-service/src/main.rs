use actix_middleware::{IdentityMiddleware, Logging};
use actix_web::{web, App, HttpServer};
use queue_service::{
    config, error, logging, metrics, routes,
    services::DiscussionService,
    state::AppState,
    websocket::{event_channel, start_event_dispatcher, ConnectionRegistry},
};
use std::sync::Arc;

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[actix_web::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);
    let policy = Arc::new(cfg.identity_policy());

    let registry = ConnectionRegistry::new(cfg.ws.buffer_capacity);
    let (publisher, events) = event_channel();
    let discussion = Arc::new(DiscussionService::new(cfg.root_topic.clone(), publisher));

    // Single fan-out task; keeps broadcast order equal to commit order
    let _dispatcher = start_event_dispatcher(events, registry.clone());

    let state = AppState {
        discussion,
        registry: registry.clone(),
        config: cfg.clone(),
    };

    let bind_addr = cfg.bind_addr();
    tracing::info!(
        %bind_addr,
        buffer_capacity = cfg.ws.buffer_capacity,
        privileged_group = %cfg.privileged_group,
        "starting queue-service"
    );

    let server = HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logging)
            .app_data(web::Data::new(state.clone()))
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::metrics_handler))
            .service(
                web::scope("/api")
                    .wrap(IdentityMiddleware::new(policy.clone()))
                    .configure(routes::configure),
            )
    })
    .disable_signals()
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind REST: {e}")))?
    .run();

    // Open websockets would hold a graceful stop until its timeout
    let server_handle = server.handle();
    actix_rt::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received");
        registry.close_all().await;
        server_handle.stop(true).await;
    });

    server
        .await
        .map_err(|e| error::AppError::StartServer(format!("REST server: {e}")))
}
