use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden_backend::{
    config::Config, db::connection::create_pool, repositories::session as session_repo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url, 1).await?;

    let deleted = session_repo::delete_expired_sessions(&pool).await?;
    if deleted > 0 {
        tracing::info!("Deleted {} expired sessions", deleted);
    }

    sqlx::query("VACUUM (ANALYZE) session")
        .execute(&pool)
        .await?;

    Ok(())
}
