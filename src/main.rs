use std::sync::Arc;

use filmoteka::{AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,filmoteka=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.addr;
    tracing::info!(
        database_url = %config.database_url,
        load_strategy = ?config.load_strategy,
        "starting"
    );

    let state = Arc::new(AppState::connect(config).await?);
    let app = filmoteka::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
