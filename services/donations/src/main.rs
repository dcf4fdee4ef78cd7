use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use charity_auth_types::identity::SessionKey;
use charity_core::config::Config;
use charity_core::tracing::init_tracing;

use charity_donations::config::DonationsConfig;
use charity_donations::router::build_router;
use charity_donations::state::AppState;
use charity_donations::usecase::admin::AdminRegistry;
use charity_donations::usecase::mail::SiteLinks;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = DonationsConfig::try_from_env().context("load configuration")?;
    init_tracing(config.debug);

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .context("create Redis pool")?;

    let admin = AdminRegistry::with_defaults();
    info!(resources = admin.len(), "admin console registered");

    let state = AppState {
        db,
        redis,
        session_key: SessionKey::new(config.secret_key),
        cookie_domain: config.cookie_domain,
        links: SiteLinks::new(config.site_domain),
        from_email: config.default_from_email,
        admin: Arc::new(admin),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.donations_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("donations service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
