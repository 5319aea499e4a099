//! Charging station DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{ChargingStation, ChargingStationDraft};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargingStationDto {
    pub id: i32,
    pub address_id: Option<i32>,
    /// `null` means the station takes any number of reservations
    #[serde(rename = "numberOfSpaces")]
    pub number_of_spaces: Option<i32>,
}

impl From<ChargingStation> for ChargingStationDto {
    fn from(s: ChargingStation) -> Self {
        Self {
            id: s.id,
            address_id: s.address_id,
            number_of_spaces: s.number_of_spaces,
        }
    }
}

/// Body of create and full update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChargingStationRequest {
    pub address_id: Option<i32>,
    #[serde(rename = "numberOfSpaces")]
    #[validate(range(min = 1, message = "numberOfSpaces must be at least 1"))]
    pub number_of_spaces: Option<i32>,
}

impl From<ChargingStationRequest> for ChargingStationDraft {
    fn from(r: ChargingStationRequest) -> Self {
        Self {
            address_id: r.address_id,
            number_of_spaces: r.number_of_spaces,
        }
    }
}
