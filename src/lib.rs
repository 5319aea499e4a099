//! # EV Reserve
//!
//! Reservation backend for electric-vehicle charging stations. Users book
//! time slots at stations; a booking is admitted only while the station has
//! a free space for every instant of the requested interval.
//!
//! ## Architecture
//!
//! - **domain**: entities, the admission rule and repository traits
//! - **application**: use cases (identity, stations, reservations)
//! - **infrastructure**: SeaORM persistence, JWT and password hashing
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

use tracing_subscriber::EnvFilter;

pub use config::{default_config_path, AppConfig, LoggingConfig, CONFIG_ENV};
pub use infrastructure::{
    connect_and_migrate, init_database, DatabaseConfig, SeaOrmRepositoryProvider,
};
pub use interfaces::http::{create_api_router, ApiContext};

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
