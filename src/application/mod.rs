//! Application layer: use-case orchestration over the domain repositories

pub mod identity;
pub mod reservations;
pub mod stations;

pub use identity::{AuthResult, UserService};
pub use reservations::{Booking, ReservationChange, ReservationService, StationLocks};
pub use stations::StationService;
