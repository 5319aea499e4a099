//! Charging station repository interface

use async_trait::async_trait;

use super::model::{ChargingStation, ChargingStationDraft};
use crate::shared::{DomainError, DomainResult};

#[async_trait]
pub trait ChargingStationRepository: Send + Sync {
    async fn find_all(&self) -> DomainResult<Vec<ChargingStation>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ChargingStation>>;

    async fn create(&self, draft: ChargingStationDraft) -> DomainResult<ChargingStation>;

    /// Errors with `NotFound` when no station has this id.
    async fn update(&self, id: i32, draft: ChargingStationDraft) -> DomainResult<ChargingStation>;

    async fn delete(&self, id: i32) -> DomainResult<()>;

    /// Capacity of a station, `None` when unconstrained.
    async fn station_capacity(&self, id: i32) -> DomainResult<Option<i32>> {
        self.find_by_id(id)
            .await?
            .map(|s| s.number_of_spaces)
            .ok_or_else(|| DomainError::not_found("ChargingStation", id))
    }
}
