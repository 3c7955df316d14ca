//! DyeMind web server.
//!
//! Run with: cargo run -p dyemind-web

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting DyeMind server...");

    let config = dyemind_core::CoreConfig::load()?;
    let state = dyemind_web::state::AppState::from_config(&config)?;
    let app = dyemind_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Server listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
