use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use counterpoint::config::Config;
use counterpoint::gateway::CompletionGateway;
use counterpoint::server::{AppState, router};
use counterpoint::transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load();

    // Fails here with a diagnostic if the provider credential is missing
    let transport = Arc::new(HttpTransport::new(&config.provider)?);
    let gateway = Arc::new(CompletionGateway::new(
        transport,
        config.provider.model.clone(),
        config.provider.profile,
    ));

    let bind: SocketAddr = config.server.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        model = %config.provider.model,
        profile = ?config.provider.profile,
        "Starting debate proxy"
    );

    axum::serve(listener, router(AppState { gateway })).await?;
    Ok(())
}
