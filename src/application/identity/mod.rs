//! Identity module: user management & authentication
//!
//! Contains the `UserService` which orchestrates registration, login,
//! profile updates and account removal.

pub mod service;

pub use service::{AuthResult, UserService};
