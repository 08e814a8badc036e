//! Backend entry-point: loads settings, prepares persistence and serves the
//! REST API, the notification stream and the OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bluecaller::inbound::http::health::HealthState;
use bluecaller::outbound::persistence::{DbPool, run_migrations};
use bluecaller::settings::AppSettings;

use server::ServerConfig;

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

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?
        .validate()
        .map_err(|err| std::io::Error::other(format!("invalid settings: {err}")))?;

    let mut config = ServerConfig::new(settings);

    if let Some(pool_config) = config.settings.database.clone() {
        if config.settings.run_migrations {
            let applied = run_migrations(pool_config.database_url())
                .await
                .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
            info!(applied, "database migrations complete");
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("database_url not configured; persistence is disabled");
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::build_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    info!("server listening");
    server.await
}
