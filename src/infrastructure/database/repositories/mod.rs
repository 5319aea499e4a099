//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod charging_station_repository;
pub mod repository_provider;
pub mod reservation_repository;
pub mod user_repository;

pub use charging_station_repository::SeaOrmChargingStationRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use reservation_repository::SeaOrmReservationRepository;
pub use user_repository::SeaOrmUserRepository;
