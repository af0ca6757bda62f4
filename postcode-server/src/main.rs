use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use postcode_server::config::ServerConfig;
use postcode_server::store::{Shard, ShardStore};
use postcode_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    // Both shards must be present before we accept requests
    let store = ShardStore::open(&config.data_dir)?;
    for shard in Shard::ALL {
        info!(%shard, path = %store.paths().path(shard).display(), "postcode shard found");
    }

    let state = AppState::new(store, config.auth_token.as_str());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Postcode lookup listening on http://{}", config.bind_addr);
    info!("  POST /        - Look up a JSON list of postcodes");
    info!("  GET  /health  - Health check");

    axum::serve(listener, app).await?;
    Ok(())
}
