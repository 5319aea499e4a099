//! Reservation DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::Reservation;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: i32,
    #[serde(rename = "chargingStation_id")]
    pub charging_station_id: i32,
    #[serde(rename = "user_id")]
    pub user_id: i32,
    pub username: String,
    pub start_reservation: DateTime<Utc>,
    pub end_reservation: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            charging_station_id: r.charging_station_id,
            user_id: r.user_id,
            username: r.username,
            start_reservation: r.start_reservation,
            end_reservation: r.end_reservation,
        }
    }
}

/// Body of create and full update. The owner comes from the token on
/// create and is kept on update.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[serde(rename = "chargingStation_id")]
    #[validate(range(min = 1))]
    pub charging_station_id: i32,
    #[validate(custom(
        function = "in_the_future",
        message = "startReservation must be in the future"
    ))]
    pub start_reservation: DateTime<Utc>,
    #[validate(custom(
        function = "in_the_future",
        message = "endReservation must be in the future"
    ))]
    pub end_reservation: DateTime<Utc>,
}

fn in_the_future(at: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *at > Utc::now() {
        Ok(())
    } else {
        Err(ValidationError::new("in_the_future"))
    }
}
