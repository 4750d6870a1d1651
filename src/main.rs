use awsgate::api::{build_router, AppState};
use awsgate::{factory, Config, Provider};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    awsgate::init();

    let provider: Arc<dyn Provider> = Arc::from(factory::new_provider(config.clone())?);
    tracing::info!(
        provider = provider.name(),
        default_region = %config.default_region,
        session_seconds = config.session_duration.as_secs(),
        "provider ready"
    );

    let bind = config.bind;
    let app = build_router(AppState::new(config, provider));

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %bind, "awsgate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("awsgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
