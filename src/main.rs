//! StageLight content service
//!
//! Main application entry point

use std::net::SocketAddr;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use StageLight::{
    config::Settings,
    database::{connection::DatabaseConfig, create_pool, run_migrations},
    handlers::create_router,
    realtime::{spawn_listener, RealtimeHub},
    services::ServiceFactory,
    state::AppContext,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate().context("Invalid configuration")?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", StageLight::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.backend)).await?;
    run_migrations(&db_pool).await?;

    // Change feed
    let hub = RealtimeHub::new(settings.realtime.buffer_size);
    let listener = if settings.realtime.enabled {
        info!(channel = %settings.realtime.channel, "Starting realtime change listener");
        Some(spawn_listener(db_pool.clone(), hub.clone(), settings.realtime.channel.clone()))
    } else {
        warn!("Realtime change feed disabled");
        None
    };

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(&settings).await?;
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let ctx = AppContext::new(settings, db_pool, services, hub);
    let rate_limits = ctx.rate_limits.clone();
    let janitor = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limits.cleanup_old_entries();
        }
    });

    let app = create_router(ctx);
    let tcp = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("StageLight listening on {}", addr);

    axum::serve(tcp, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    janitor.abort();
    if let Some(listener) = listener {
        listener.abort();
    }

    info!("StageLight has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
