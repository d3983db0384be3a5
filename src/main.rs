use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use travel_journal::config::Config;
use travel_journal::database;
use travel_journal::state::AppState;
use travel_journal::web::routes;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    info!(
        build_id = env!("TRAVEL_JOURNAL_BUILD_ID"),
        "Starting travel journal"
    );

    let pool = database::connect(&config.database_url, config.db_max_connections).await?;
    let app = routes::router(AppState::new(pool));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
