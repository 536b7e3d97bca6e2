use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden_backend::{
    config::Config,
    db::connection::{create_pool, run_migrations},
    routes::app_router,
    services::bootstrap::bootstrap,
    state::AppState,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warden_backend=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing();
    tracing::info!(config = ?config, "Loaded configuration from environment/.env");

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;
    bootstrap(&pool, &config).await?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config);
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
