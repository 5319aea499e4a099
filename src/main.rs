//! EV Reserve server
//!
//! Reads configuration from a TOML file (~/.config/ev-reserve/config.toml or
//! `$EVRESERVE_CONFIG`), migrates the database and serves the REST API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use ev_reserve::application::{ReservationService, StationLocks, StationService, UserService};
use ev_reserve::domain::RepositoryProvider;
use ev_reserve::infrastructure::crypto::jwt::JwtConfig;
use ev_reserve::shared::ShutdownCoordinator;
use ev_reserve::{
    connect_and_migrate, create_api_router, default_config_path, init_logging, ApiContext,
    AppConfig, DatabaseConfig, SeaOrmRepositoryProvider, CONFIG_ENV,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let (app_cfg, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_logging(&app_cfg.logging);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    info!("Starting EV Reserve...");

    // ── Prometheus metrics recorder (before any metrics call) ──
    let prometheus_handle = match metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    };

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig::from(&app_cfg.database);
    let db = match connect_and_migrate(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to prepare database: {}", e);
            return Err(e.into());
        }
    };

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // ── Services ───────────────────────────────────────────────
    let jwt_config = JwtConfig::from(&app_cfg.security);
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    let user_service = Arc::new(
        UserService::new(repos.clone(), jwt_config.clone())
            .with_bcrypt_cost(app_cfg.security.bcrypt_cost)
            .with_auth_delay(Duration::from_millis(app_cfg.security.auth_max_delay_ms)),
    );
    if let Err(e) = user_service.seed_admin(&app_cfg.admin).await {
        error!("Failed to create default admin: {}", e);
    }

    let locks = StationLocks::new();
    let station_service = Arc::new(StationService::new(repos.clone(), locks.clone()));
    let reservation_service = Arc::new(
        ReservationService::new(repos, locks)
            .with_recheck_on_update(app_cfg.admission.recheck_on_update),
    );

    let api_router = create_api_router(ApiContext {
        db: db.clone(),
        jwt_config,
        user_service,
        station_service,
        reservation_service,
        cors: app_cfg.cors.clone(),
        env: app_cfg.server.env.clone(),
        metrics: prometheus_handle,
    });

    // ── Serve until SIGINT / SIGTERM ───────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    let addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    let api_shutdown = shutdown_signal.clone();
    let server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
        api_shutdown.wait().await;
        info!("REST API received shutdown signal");
    });

    if let Err(e) = server.await {
        error!("REST API server error: {}", e);
    }
    shutdown_signal.trigger();

    let cleanup_db = db.clone();
    shutdown
        .shutdown_with_cleanup(|| async move {
            if let Err(e) = cleanup_db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        })
        .await;

    info!("EV Reserve shutdown complete");
    Ok(())
}
