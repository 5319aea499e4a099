//! Liveness and version endpoints

pub mod handlers;

pub use handlers::*;
