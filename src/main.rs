use std::net::SocketAddr;

mod app;
mod auth;
mod checklists;
mod config;
mod db;
mod error;
#[cfg(test)]
mod memory;
mod state;
mod storage;
mod users;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "checklist_server=debug,axum=info,tower_http=info".to_string());
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

    let state = AppState::init().await?;
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port).parse()?;

    let app = app::build_app(state.clone());
    let served = app::serve(app, addr).await;

    state.close().await;
    served
}
