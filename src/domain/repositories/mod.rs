//! Repository provider for the domain layer

use super::charging_station::ChargingStationRepository;
use super::reservation::ReservationRepository;
use super::user::UserRepository;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let capacity = repos.charging_stations().station_capacity(3).await?;
///     let mine = repos.reservations().find_by_user(42).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn charging_stations(&self) -> &dyn ChargingStationRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
}
