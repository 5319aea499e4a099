//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;

pub use database::repositories::SeaOrmRepositoryProvider;
pub use database::{connect_and_migrate, init_database, DatabaseConfig};
