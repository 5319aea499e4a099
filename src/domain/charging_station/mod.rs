//! Charging station aggregate
//!
//! A station is the capacity provider for reservations: its
//! `number_of_spaces` bounds how many reservations may overlap in time.

pub mod model;
pub mod repository;

pub use model::{ChargingStation, ChargingStationDraft};
pub use repository::ChargingStationRepository;
