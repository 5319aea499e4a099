pub mod charging_stations;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod reservations;
pub mod sessions;
pub mod users;
