use std::sync::Arc;

use aiornot::quota::GuestQuotaGate;
use aiornot::state::AppState;
use aiornot::{app, config, db, storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aiornot=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    storage::ensure_dirs(&config.upload_folder)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let state = Arc::new(AppState {
        pool,
        config: config.clone(),
        guest_quota: Arc::new(GuestQuotaGate::default()),
    });

    let app = app(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("aiornot listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
