//! Users module: registration, profiles and per-user reservations

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
