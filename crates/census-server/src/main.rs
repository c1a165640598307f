//! Census Server - main entry point

use anyhow::Result;
use census_common::logging::{init_logging, LogConfig};
use census_ingest::{store::PgUserStore, IngestPipeline};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing::info;

use census_server::{
    api::{self, AppState},
    config::Config,
    db, server,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("census-server")
        .filter_directives("census_server=debug,census_ingest=info,tower_http=info,sqlx=warn")
        .build()
        .merge_env()?;
    let _log_guard = init_logging(&log_config)?;

    info!("Starting census server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        batch_size = config.ingest.batch_size,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;

    if config.database.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let store = Arc::new(PgUserStore::new(pool.clone()));
    let pipeline = IngestPipeline::new(store).with_batch_size(config.ingest.batch_size);

    let state = AppState {
        db: pool,
        pipeline: Arc::new(pipeline),
        ingest: Arc::new(config.ingest.clone()),
    };
    let app = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is listening on http://{}", addr);

    server::serve(
        listener,
        app,
        server::shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await?;

    info!("Server shut down gracefully");

    Ok(())
}
