use mimalloc::MiMalloc;
use refri_express::config::Config;
use refri_express::router::{RefriState, refri_router};
use refri_express::{AuthGate, telemetry};
use tokio::net::TcpListener;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    telemetry::init(&cfg.loglevel);
    info!(config = ?cfg, "configuration loaded");

    let gate = AuthGate::from_config(&cfg).inspect_err(|e| {
        error!(error = %e, "cannot start without a token secret");
    })?;

    let app = refri_router(RefriState::new(gate));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
