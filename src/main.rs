//! MovieTime Backend - REST API for the movie and TV show catalogue

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movietime::config::Config;
use movietime::db::Database;
use movietime::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movietime=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting MovieTime Backend");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config).await?;
    tracing::info!("Database connected");

    tokio::fs::create_dir_all(&config.images_path).await?;
    tracing::info!(path = %config.images_path.display(), "Images directory ready");

    if config.admin_token_required {
        tracing::info!("Admin routes require an admin bearer token");
    }

    let addr = config.bind_addr()?;
    let state = AppState::new(config, db);
    let app = build_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
