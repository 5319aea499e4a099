//! Charging station domain entity

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargingStation {
    pub id: i32,
    pub address_id: Option<i32>,
    /// Concurrent reservations allowed; `None` means unconstrained.
    pub number_of_spaces: Option<i32>,
}

/// Fields written on create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargingStationDraft {
    pub address_id: Option<i32>,
    pub number_of_spaces: Option<i32>,
}
