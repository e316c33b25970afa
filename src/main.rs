use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fakturist::config;
use fakturist::routes;
use fakturist::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fakturist=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = config::init()?;
    let bind_addr = config.bind_addr.clone();

    // Database, company seed, templates, session store
    let state = AppState::new(config).await?;
    tracing::info!("database ready, company seeded");

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
