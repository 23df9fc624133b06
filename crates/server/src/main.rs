use std::sync::Arc;

use tracing::info;

use cancha_warehouse::{config, WarehouseClient, WarehouseConfig};

use cancha_server::router::build_router;
use cancha_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    config::load_dotenv();

    // Startup invariant: the Databricks connection triple must be present.
    let warehouse_config = WarehouseConfig::from_env()?;
    let catalogs = warehouse_config.catalogs.clone();
    let executor = Arc::new(WarehouseClient::new(warehouse_config));

    let state = Arc::new(AppState::new(executor, catalogs));
    let app = build_router(state);

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
