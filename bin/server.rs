// Data Visualization API - Web Server

use anyhow::{Context, Result};
use data_visualization_api::{
    count_rows, init_tracing, open_database, router, setup_database, AppState, Settings,
};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env().context("Invalid configuration")?;
    init_tracing(&settings)?;

    tracing::info!(
        version = data_visualization_api::VERSION,
        environment = %settings.environment,
        frontend_url = %settings.frontend_url,
        "starting data visualization api"
    );

    // Open database and make sure the tables exist
    let conn = open_database(&settings.database)?;
    setup_database(&conn)?;
    tracing::info!(
        database = ?settings.database,
        data_types = count_rows(&conn, "data_types")?,
        data_entries = count_rows(&conn, "data_entries")?,
        "database ready"
    );

    let addr = settings.bind_addr();
    let app = router(AppState::new(conn, settings));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
