use std::sync::Arc;

use backend::queries::PgStore;
use backend::routes::AppState;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting blog server");

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable is not set")?;
    let pool = PgPool::connect(&database_url).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete");

    let state = AppState::new(Arc::new(PgStore::new(pool)));

    let _ = backend::rocket(state).launch().await?;
    Ok(())
}
