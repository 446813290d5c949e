use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mjbea::{
    api,
    config::Settings,
    integrations::HttpDocumentFetcher,
    service::ServiceContext,
    storage::LocalDocumentStorage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mjbea=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting MJBEA registration server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Document storage and the fetcher used for bundles
    let bucket_dir = settings.bucket_dir();
    tokio::fs::create_dir_all(&bucket_dir).await?;
    tracing::info!("Serving documents from {}", bucket_dir.display());

    let storage = Arc::new(LocalDocumentStorage::new(&settings.storage));
    let fetcher = Arc::new(HttpDocumentFetcher::new(&settings.fetcher)?);

    if settings.auth.admin_token == Settings::default().auth.admin_token {
        tracing::warn!("Admin token is the default value; set MJBEA__AUTH__ADMIN_TOKEN");
    }

    // Create service context
    let service_context = Arc::new(ServiceContext::new(db_pool, storage, fetcher));

    let settings = Arc::new(settings);
    let app = api::create_app(service_context, settings.clone());

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on {}", settings.server.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
