use std::sync::Arc;

use anyhow::Context;
use storage::{
    Database,
    repository::{AthleteRecordRepository, MemoryRecordStore, RecordStore},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod routes;
mod state;

use config::{Config, StoreBackend};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::leaderboard::handlers::get_leaderboard,
        features::submissions::handlers::submit_time,
    ),
    components(
        schemas(
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::submission::SubmitRequest,
            storage::dto::submission::SubmitResponse,
            storage::dto::common::ErrorResponse,
            storage::models::AthleteRecord,
            storage::models::Segment,
            storage::models::Gender,
            storage::services::personal_best::UpsertAction,
        )
    ),
    tags(
        (name = "leaderboard", description = "Segment rankings"),
        (name = "submissions", description = "Personal-best submissions"),
    )
)]
struct ApiDoc;

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, records are lost on restart");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("Cannot load DATABASE_URL env variable")?;

            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(database_url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");

            Ok(Arc::new(AthleteRecordRepository::new(db.pool().clone())))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Stromohrot leaderboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!(
        "Configuration loaded successfully (overwrite policy: {})",
        config.overwrite_policy
    );

    let store = build_store(&config).await?;
    let state = AppState::new(store, config.overwrite_policy);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let app = routes::configure(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
