//! Charging station management

pub mod service;

pub use service::StationService;
