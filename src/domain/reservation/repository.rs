//! Reservation repository interface

use async_trait::async_trait;

use super::admission::TimeInterval;
use super::model::{NewReservation, Reservation};
use crate::shared::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// All reservations, or only those of `owner` when given.
    async fn find_all(&self, owner: Option<i32>) -> DomainResult<Vec<Reservation>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>>;

    async fn find_by_user(&self, user_id: i32) -> DomainResult<Vec<Reservation>> {
        self.find_all(Some(user_id)).await
    }

    /// Number of reservations at `station_id` whose stored `[s, e]` satisfies
    /// `s <= interval.end && e >= interval.start`. `exclude` skips one
    /// reservation id (the one being replaced on update).
    async fn count_overlapping(
        &self,
        station_id: i32,
        interval: &TimeInterval,
        exclude: Option<i32>,
    ) -> DomainResult<u64>;

    async fn insert(&self, reservation: NewReservation) -> DomainResult<Reservation>;

    /// Full replace. Errors with `NotFound` when no reservation has this id.
    async fn replace(&self, id: i32, reservation: NewReservation) -> DomainResult<Reservation>;

    async fn delete(&self, id: i32) -> DomainResult<()>;
}
