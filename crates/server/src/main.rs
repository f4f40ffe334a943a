use std::sync::Arc;

use anyhow::Context;
use remo_client::RemoClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod controller;

use api::build_router;
use app_state::AppState;
use config::load_settings;
use controller::SelectionController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings().context("invalid configuration")?;
    let directory = RemoClient::new(&settings.api_base_url, settings.access_token.clone())?;
    let directory_url = directory.base_url().clone();
    let controller = SelectionController::new(
        Arc::new(directory),
        settings.appliance.clone(),
        settings.signals.clone(),
    )?;

    info!(
        api = %directory_url,
        appliance = %controller.appliance(),
        signals = ?controller.signal_names(),
        "selection controller ready"
    );

    let state = AppState {
        controller: Arc::new(controller),
    };
    let app = build_router(Arc::new(state), &settings.static_dir);

    let addr = settings.server_bind;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
