//! Reservation booking: admission against station capacity

pub mod locks;
pub mod service;

pub use locks::StationLocks;
pub use service::{Booking, ReservationChange, ReservationService};
