//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server, load_session_key};
use taplist::inbound::http::health::HealthState;
use taplist::outbound::images::LocalImageStore;
use taplist::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let key = load_session_key(&settings).map_err(std::io::Error::other)?;
    let images = LocalImageStore::open(
        settings.upload_dir(),
        settings.image_dir(),
        settings.image_base_url(),
    )?;

    let mut config = ServerConfig::new(key, settings.bind_addr(), images)
        .with_cookie_secure(settings.cookie_secure())
        .with_admin_signup(settings.allow_admin_signup);

    if let Some(database_url) = settings.database_url.clone() {
        config = config.with_db_pool(prepare_database(database_url, &settings).await?);
    } else {
        warn!("no database URL configured; documents live in process memory");
    }

    let health_state = web::Data::new(HealthState::new(config.store_backend()));
    info!(
        bind_addr = %settings.bind_addr(),
        backend = ?settings.store_backend(),
        "starting server"
    );
    create_server(health_state, config)?.await
}

async fn prepare_database(
    database_url: String,
    settings: &ServerSettings,
) -> std::io::Result<DbPool> {
    let migration_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema up to date");

    let pool_config = PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
    DbPool::new(pool_config).await.map_err(std::io::Error::other)
}
