use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall_backend::{
    app::build_router,
    clock::SystemClock,
    config::Config,
    services::sweeper::spawn_token_sweeper,
    state::{sink_from_config, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; invalid TTLs and token sizes stop startup here.
    let config = Config::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        token_ttl_seconds = config.token_ttl.as_secs(),
        token_bytes = config.token_bytes,
        sweep_interval_seconds = config.sweep_interval_seconds,
        time_zone = %config.time_zone,
        sink_delivery = ?config.sink_delivery,
        consume_on_validate = config.consume_on_validate,
        cors_allow_origins = ?config.cors_allow_origins,
        cors_allow_credentials = config.cors_allow_credentials,
        "Loaded configuration from environment/.env"
    );

    let sink = sink_from_config(&config);
    let state = AppState::from_config(config.clone(), Arc::new(SystemClock), sink);

    let sweeper = (config.sweep_interval_seconds > 0).then(|| {
        spawn_token_sweeper(
            state.service.store().clone(),
            Duration::from_secs(config.sweep_interval_seconds),
        )
    });

    let app = build_router(state)?;

    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
