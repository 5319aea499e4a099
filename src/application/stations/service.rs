//! Charging station service
//!
//! Capacity changes take the station's admission lock, so a booking never
//! counts against a capacity that changes underneath it.

use std::sync::Arc;

use tracing::info;

use crate::application::reservations::StationLocks;
use crate::domain::{
    ChargingStation, ChargingStationDraft, DomainError, DomainResult, RepositoryProvider,
};

pub struct StationService {
    repos: Arc<dyn RepositoryProvider>,
    locks: StationLocks,
}

impl StationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, locks: StationLocks) -> Self {
        Self { repos, locks }
    }

    pub async fn get_all(&self) -> DomainResult<Vec<ChargingStation>> {
        self.repos.charging_stations().find_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<ChargingStation> {
        self.repos
            .charging_stations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| no_such_station(id))
    }

    pub async fn create(&self, draft: ChargingStationDraft) -> DomainResult<ChargingStation> {
        let station = self.repos.charging_stations().create(draft).await?;
        info!(
            station_id = station.id,
            spaces = ?station.number_of_spaces,
            "Charging station created"
        );
        Ok(station)
    }

    /// Replaces address and capacity. Lowering the capacity leaves existing
    /// reservations in place; it only affects later admissions.
    pub async fn update(
        &self,
        id: i32,
        draft: ChargingStationDraft,
    ) -> DomainResult<ChargingStation> {
        let _guard = self.locks.acquire(id).await;
        self.repos
            .charging_stations()
            .update(id, draft)
            .await
            .map_err(|e| missing_station(id, e))
    }

    /// Removes the station together with its reservations and drops its
    /// lock entry.
    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        {
            let _guard = self.locks.acquire(id).await;
            self.repos
                .charging_stations()
                .delete(id)
                .await
                .map_err(|e| missing_station(id, e))?;
        }
        self.locks.forget(id);
        info!(station_id = id, "Charging station deleted");
        Ok(())
    }
}

pub(crate) fn no_such_station(id: i32) -> DomainError {
    DomainError::Missing(format!("There is no chargingStation with id {}.", id))
}

fn missing_station(id: i32, e: DomainError) -> DomainError {
    if e.is_not_found() {
        no_such_station(id)
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::infrastructure::database::test_database;
    use crate::infrastructure::SeaOrmRepositoryProvider;

    async fn service_with(locks: StationLocks) -> StationService {
        let repos = SeaOrmRepositoryProvider::new(test_database().await);
        StationService::new(Arc::new(repos), locks)
    }

    async fn service() -> StationService {
        service_with(StationLocks::new()).await
    }

    #[tokio::test]
    async fn crud_cycle() {
        let svc = service().await;
        let created = svc
            .create(ChargingStationDraft {
                address_id: Some(2),
                number_of_spaces: Some(3),
            })
            .await
            .unwrap();
        assert_eq!(svc.get_all().await.unwrap(), vec![created.clone()]);

        let updated = svc
            .update(
                created.id,
                ChargingStationDraft {
                    address_id: Some(2),
                    number_of_spaces: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.number_of_spaces, None);

        svc.delete(created.id).await.unwrap();
        let err = svc.get_by_id(created.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("There is no chargingStation with id {}.", created.id)
        );
    }

    #[tokio::test]
    async fn update_missing_station_is_not_found() {
        let svc = service().await;
        let err = svc
            .update(5, ChargingStationDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Missing(_)));
    }

    #[tokio::test]
    async fn capacity_change_waits_for_the_admission_lock() {
        let locks = StationLocks::new();
        let svc = Arc::new(service_with(locks.clone()).await);
        let station = svc
            .create(ChargingStationDraft {
                address_id: None,
                number_of_spaces: Some(2),
            })
            .await
            .unwrap()
            .id;

        let guard = locks.acquire(station).await;
        let smaller = ChargingStationDraft {
            address_id: None,
            number_of_spaces: Some(1),
        };
        let pending = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.update(station, smaller).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());
        assert_eq!(
            svc.get_by_id(station).await.unwrap().number_of_spaces,
            Some(2)
        );

        drop(guard);
        let updated = pending.await.unwrap().unwrap();
        assert_eq!(updated.number_of_spaces, Some(1));
    }

    #[tokio::test]
    async fn delete_forgets_the_station_lock() {
        let locks = StationLocks::new();
        let svc = service_with(locks.clone()).await;
        let station = svc.create(ChargingStationDraft::default()).await.unwrap();
        drop(locks.acquire(station.id).await);
        assert_eq!(locks.len(), 1);

        svc.delete(station.id).await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
