use ubuntumeet::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    if config.provider.api_key().is_none() {
        tracing::warn!(var = %config.provider.api_key_var, "provider api key is not set, room creation will fail until it is");
    }

    let bind_address = config.bind_address.clone();
    let app = app(AppState::new(config).map_err(|err| err.0)?);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), %bind_address, "UbuntuMeet listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
