//! Reservation domain entity

use chrono::{DateTime, Utc};

use super::admission::TimeInterval;

/// A booked interval at a charging station, occupying one space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: i32,
    pub charging_station_id: i32,
    pub user_id: i32,
    /// Username of the owner, joined in by the repository.
    pub username: String,
    pub start_reservation: DateTime<Utc>,
    pub end_reservation: DateTime<Utc>,
}

impl Reservation {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start_reservation,
            end: self.end_reservation,
        }
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// Candidate reservation written on create or full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub charging_station_id: i32,
    pub user_id: i32,
    pub interval: TimeInterval,
}
