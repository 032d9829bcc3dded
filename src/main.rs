mod app;
mod auth;
mod config;
mod cors;
mod db;
mod error;
mod extract;
mod notes;
mod state;
#[cfg(test)]
mod testing;
mod users;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "technotes=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(
        origins = ?app_state.config.cors.allowed_origins(),
        "cors allow-list loaded"
    );

    let host = app_state.config.host.clone();
    let port = app_state.config.port;
    app::serve(app::build_app(app_state), &host, port).await
}
