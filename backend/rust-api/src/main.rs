use anyhow::Context;
use cyberquiz_api::{
    config::{Config, LogFormat},
    create_router,
    services::{session_reaper::SessionReaper, AppState},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first: it decides the log format
    let config = Config::load().context("Failed to load configuration")?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cyberquiz_api=debug,tower_http=debug".into());

    match config.log.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    tracing::info!("Starting CyberQuiz question API");
    tracing::info!(
        "Configuration loaded for environment: {:?}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
    );

    let bind_addr = config.server.bind_addr.clone();
    let session_settings = config.sessions.clone();

    let app_state =
        Arc::new(AppState::new(config).context("Failed to initialize application state")?);

    match SessionReaper::from_settings(app_state.quiz.clone(), &session_settings) {
        Some(reaper) => {
            tokio::spawn(reaper.run());
        }
        None => tracing::info!("Idle session expiry disabled"),
    }

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
