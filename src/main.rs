use anyhow::Context;
use backoffice::config::AppConfig;
use backoffice::{db, routes, AppState};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backoffice=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let addr = format!("{}:{}", config.host, config.port);
    let environment = config.environment.as_str();
    let app = routes::router(AppState { db: pool, config });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(host = %addr, environment, "Starting back-office API server");
    axum::serve(listener, app).await?;

    Ok(())
}
