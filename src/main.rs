use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use task_board_api::app_env::AppConfig;
use task_board_api::{SharedData, auth, bootstrap, db, logging, persistence, routes};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    let config = AppConfig::from_env()?;

    let otel_exporters = match config.otel_endpoints {
        Some((ref span_url, ref metric_url)) => Some(logging::init_exporters(span_url, metric_url)?),
        None => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    if config.uses_development_secret() {
        warn!("JWT_SECRET is not set, signing tokens with the development secret");
    }

    let pool = db::connect_sqlx(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    let ext_cxn = persistence::ExternalConnectivity::new(pool);

    if config.seed_demo_account {
        bootstrap::ensure_demo_account(&ext_cxn).await?;
    }

    let shared_data = Arc::new(SharedData {
        ext_cxn,
        token_keys: auth::TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl),
    });
    let app = routes::build_router(shared_data);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Binding to {}", config.bind_address))?;
    info!("Starting server on {}", config.bind_address);
    axum::serve(listener, app).await.context("Running the HTTP server")?;

    Ok(())
}
