//! Reservation aggregate
//!
//! Contains the Reservation entity, the admission rule that guards station
//! capacity, and the repository interface.

pub mod admission;
pub mod model;
pub mod repository;

pub use admission::{can_admit, AdmissionDecision, TimeInterval};
pub use model::{NewReservation, Reservation};
pub use repository::ReservationRepository;
