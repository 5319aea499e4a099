//! Domain layer: entities, the admission rule and repository interfaces

pub mod charging_station;
pub mod repositories;
pub mod reservation;
pub mod user;

pub use charging_station::{ChargingStation, ChargingStationDraft, ChargingStationRepository};
pub use repositories::RepositoryProvider;
pub use reservation::{
    can_admit, AdmissionDecision, NewReservation, Reservation, ReservationRepository,
    TimeInterval,
};
pub use user::{CreateUserDto, Role, UpdateUserDto, User, UserRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
