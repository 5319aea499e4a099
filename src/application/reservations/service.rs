//! Reservation service: admission orchestration
//!
//! `create` is the evaluate-and-admit path: the user must exist, then under
//! the station lock the station's capacity is read, a fresh overlap count is
//! compared against it and the reservation is inserted only if it fits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::identity::service::no_such_user;
use crate::application::stations::service::no_such_station;
use crate::domain::{
    can_admit, AdmissionDecision, DomainError, DomainResult, NewReservation, RepositoryProvider,
    Reservation, TimeInterval,
};

use super::locks::StationLocks;

const NO_SUCH_RESERVATION: &str = "No reservation with this id exists";

/// Request to book a station for a user.
#[derive(Debug, Clone)]
pub struct Booking {
    pub charging_station_id: i32,
    pub user_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Full replacement of a reservation's station and interval. The owner is
/// kept.
#[derive(Debug, Clone)]
pub struct ReservationChange {
    pub charging_station_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    locks: StationLocks,
    recheck_on_update: bool,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, locks: StationLocks) -> Self {
        Self {
            repos,
            locks,
            recheck_on_update: true,
        }
    }

    /// Whether `update` runs the capacity check again.
    pub fn with_recheck_on_update(mut self, recheck: bool) -> Self {
        self.recheck_on_update = recheck;
        self
    }

    // ── Admission ───────────────────────────────────────────────

    /// Evaluate a booking and store it if the station has room.
    pub async fn create(&self, booking: Booking) -> DomainResult<Reservation> {
        let interval = TimeInterval::new(booking.start, booking.end)?;
        self.ensure_user(booking.user_id).await?;

        let _guard = self.locks.acquire(booking.charging_station_id).await;
        let capacity = self.station_capacity(booking.charging_station_id).await?;
        self.admit(booking.charging_station_id, capacity, &interval, None)
            .await?;

        let reservation = self
            .repos
            .reservations()
            .insert(NewReservation {
                charging_station_id: booking.charging_station_id,
                user_id: booking.user_id,
                interval,
            })
            .await?;

        info!(
            reservation_id = reservation.id,
            station_id = reservation.charging_station_id,
            user_id = reservation.user_id,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Replace a reservation visible within `scope`.
    ///
    /// The owner and the target station must still exist. When rechecking is
    /// enabled the new interval is admitted against the target station with
    /// the reservation itself left out of the count.
    pub async fn update(
        &self,
        id: i32,
        scope: Option<i32>,
        change: ReservationChange,
    ) -> DomainResult<Reservation> {
        let interval = TimeInterval::new(change.start, change.end)?;
        let existing = self.get_by_id(id, scope).await?;
        self.ensure_user(existing.user_id).await?;

        let candidate = NewReservation {
            charging_station_id: change.charging_station_id,
            user_id: existing.user_id,
            interval,
        };

        let _guard = self.locks.acquire(change.charging_station_id).await;
        let capacity = self.station_capacity(change.charging_station_id).await?;
        if self.recheck_on_update {
            self.admit(change.charging_station_id, capacity, &interval, Some(id))
                .await?;
        }
        let reservation = self
            .repos
            .reservations()
            .replace(id, candidate)
            .await
            .map_err(missing_reservation)?;

        info!(
            reservation_id = id,
            station_id = reservation.charging_station_id,
            "Reservation updated"
        );
        Ok(reservation)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Reservations visible within `scope`: everything for `None`, otherwise
    /// only those owned by that user.
    pub async fn get_all(&self, scope: Option<i32>) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_all(scope).await
    }

    /// A reservation outside `scope` is reported as missing.
    pub async fn get_by_id(&self, id: i32, scope: Option<i32>) -> DomainResult<Reservation> {
        match self.repos.reservations().find_by_id(id).await? {
            Some(r) if scope.map_or(true, |owner| r.is_owned_by(owner)) => Ok(r),
            _ => Err(DomainError::Missing(NO_SUCH_RESERVATION.into())),
        }
    }

    pub async fn list_by_user(&self, user_id: i32) -> DomainResult<Vec<Reservation>> {
        self.ensure_user(user_id).await?;
        self.repos.reservations().find_by_user(user_id).await
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn delete(&self, id: i32, scope: Option<i32>) -> DomainResult<()> {
        let existing = self.get_by_id(id, scope).await?;
        self.repos
            .reservations()
            .delete(existing.id)
            .await
            .map_err(missing_reservation)?;
        info!(reservation_id = id, "Reservation deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn ensure_user(&self, user_id: i32) -> DomainResult<()> {
        if self.repos.users().exists(user_id).await? {
            Ok(())
        } else {
            Err(no_such_user(user_id))
        }
    }

    async fn station_capacity(&self, station_id: i32) -> DomainResult<Option<i32>> {
        self.repos
            .charging_stations()
            .find_by_id(station_id)
            .await?
            .map(|s| s.number_of_spaces)
            .ok_or_else(|| no_such_station(station_id))
    }

    /// Must run while holding the station lock.
    async fn admit(
        &self,
        station_id: i32,
        capacity: Option<i32>,
        interval: &TimeInterval,
        exclude: Option<i32>,
    ) -> DomainResult<()> {
        // Unconstrained stations skip the count entirely.
        if capacity.is_none() {
            record_admission("unconstrained");
            return Ok(());
        }

        let overlapping = self
            .repos
            .reservations()
            .count_overlapping(station_id, interval, exclude)
            .await?;

        match can_admit(capacity, overlapping) {
            AdmissionDecision::Admit => {
                debug!(station_id, overlapping, ?capacity, "Reservation admitted");
                record_admission("admitted");
                Ok(())
            }
            AdmissionDecision::Reject {
                overlapping,
                capacity,
            } => {
                warn!(station_id, overlapping, capacity, "Station fully booked");
                record_admission("rejected");
                Err(DomainError::CapacityExceeded { station_id })
            }
        }
    }
}

/// A row that vanished between lookup and write reads like any other
/// missing reservation.
fn missing_reservation(e: DomainError) -> DomainError {
    if e.is_not_found() {
        DomainError::Missing(NO_SUCH_RESERVATION.into())
    } else {
        e
    }
}

fn record_admission(outcome: &'static str) {
    metrics::counter!("reservation_admissions_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::domain::{
        ChargingStationDraft, ChargingStationRepository, CreateUserDto, ReservationRepository,
        Role, UserRepository,
    };
    use crate::infrastructure::database::repositories::SeaOrmReservationRepository;
    use crate::infrastructure::database::test_database;
    use crate::infrastructure::SeaOrmRepositoryProvider;

    /// Delegates to the real store and counts overlap queries. A `stale`
    /// row is still returned by `find_by_id` after it left the store.
    struct CountingReservations {
        inner: SeaOrmReservationRepository,
        counts: AtomicUsize,
        stale: Mutex<Option<Reservation>>,
    }

    #[async_trait]
    impl ReservationRepository for CountingReservations {
        async fn find_all(&self, owner: Option<i32>) -> DomainResult<Vec<Reservation>> {
            self.inner.find_all(owner).await
        }
        async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
            let stale = self.stale.lock().unwrap().clone();
            match stale {
                Some(r) if r.id == id => Ok(Some(r)),
                _ => self.inner.find_by_id(id).await,
            }
        }
        async fn count_overlapping(
            &self,
            station_id: i32,
            interval: &TimeInterval,
            exclude: Option<i32>,
        ) -> DomainResult<u64> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            self.inner
                .count_overlapping(station_id, interval, exclude)
                .await
        }
        async fn insert(&self, reservation: NewReservation) -> DomainResult<Reservation> {
            self.inner.insert(reservation).await
        }
        async fn replace(&self, id: i32, new: NewReservation) -> DomainResult<Reservation> {
            self.inner.replace(id, new).await
        }
        async fn delete(&self, id: i32) -> DomainResult<()> {
            self.inner.delete(id).await
        }
    }

    struct CountingProvider {
        base: SeaOrmRepositoryProvider,
        reservations: CountingReservations,
    }

    impl RepositoryProvider for CountingProvider {
        fn users(&self) -> &dyn UserRepository {
            self.base.users()
        }
        fn charging_stations(&self) -> &dyn ChargingStationRepository {
            self.base.charging_stations()
        }
        fn reservations(&self) -> &dyn ReservationRepository {
            &self.reservations
        }
    }

    struct Fixture {
        svc: ReservationService,
        repos: Arc<CountingProvider>,
        locks: StationLocks,
        user_id: i32,
    }

    impl Fixture {
        async fn new() -> Self {
            let db = test_database().await;
            let repos = Arc::new(CountingProvider {
                base: SeaOrmRepositoryProvider::new(db.clone()),
                reservations: CountingReservations {
                    inner: SeaOrmReservationRepository::new(db),
                    counts: AtomicUsize::new(0),
                    stale: Mutex::new(None),
                },
            });
            let user = repos
                .users()
                .create(CreateUserDto {
                    username: "ines".into(),
                    email: "ines@example.com".into(),
                    password_hash: "hash".into(),
                    roles: vec![Role::User],
                })
                .await
                .unwrap();
            let locks = StationLocks::new();
            Self {
                svc: ReservationService::new(repos.clone(), locks.clone()),
                repos,
                locks,
                user_id: user.id,
            }
        }

        async fn station(&self, spaces: Option<i32>) -> i32 {
            self.repos
                .charging_stations()
                .create(ChargingStationDraft {
                    address_id: None,
                    number_of_spaces: spaces,
                })
                .await
                .unwrap()
                .id
        }

        fn booking(&self, station: i32, from: u32, to: u32) -> Booking {
            Booking {
                charging_station_id: station,
                user_id: self.user_id,
                start: at(from),
                end: at(to),
            }
        }

        fn count_queries(&self) -> usize {
            self.repos.reservations.counts.load(Ordering::SeqCst)
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, hour, 0, 0).unwrap()
    }

    fn change(station: i32, from: u32, to: u32) -> ReservationChange {
        ReservationChange {
            charging_station_id: station,
            start: at(from),
            end: at(to),
        }
    }

    #[tokio::test]
    async fn single_space_station_admits_once() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;

        f.svc.create(f.booking(station, 10, 12)).await.unwrap();

        let err = f.svc.create(f.booking(station, 11, 13)).await.unwrap_err();
        assert!(
            matches!(err, DomainError::CapacityExceeded { station_id } if station_id == station)
        );
    }

    #[tokio::test]
    async fn touching_boundary_is_a_conflict() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();

        let err = f.svc.create(f.booking(station, 12, 14)).await.unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn disjoint_interval_is_admitted() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        f.svc.create(f.booking(station, 13, 14)).await.unwrap();
        assert_eq!(f.svc.get_all(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unconstrained_station_admits_everything_without_counting() {
        let f = Fixture::new().await;
        let station = f.station(None).await;
        for _ in 0..5 {
            f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        }
        assert_eq!(f.svc.get_all(None).await.unwrap().len(), 5);
        assert_eq!(f.count_queries(), 0);
    }

    #[tokio::test]
    async fn two_space_station_fills_up() {
        let f = Fixture::new().await;
        let station = f.station(Some(2)).await;
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        assert!(f.svc.create(f.booking(station, 11, 12)).await.is_err());
    }

    #[tokio::test]
    async fn missing_station_fails_before_counting() {
        let f = Fixture::new().await;
        let err = f.svc.create(f.booking(999, 10, 12)).await.unwrap_err();
        assert_eq!(err.to_string(), "There is no chargingStation with id 999.");
        assert_eq!(f.count_queries(), 0);
    }

    #[tokio::test]
    async fn missing_user_fails_before_station_lookup() {
        let f = Fixture::new().await;
        let mut booking = f.booking(999, 10, 12);
        booking.user_id = 777;
        let err = f.svc.create(booking).await.unwrap_err();
        assert_eq!(err.to_string(), "There is no user with id 777.");
        assert_eq!(f.count_queries(), 0);
    }

    #[tokio::test]
    async fn reversed_interval_is_a_validation_error() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        let err = f.svc.create(f.booking(station, 12, 10)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn rejected_attempts_leave_the_count_unchanged() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        let interval = TimeInterval::new(at(9), at(13)).unwrap();

        let before = f
            .repos
            .reservations()
            .count_overlapping(station, &interval, None)
            .await
            .unwrap();
        assert!(f.svc.create(f.booking(station, 9, 13)).await.is_err());
        let after = f
            .repos
            .reservations()
            .count_overlapping(station, &interval, None)
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn update_rechecks_capacity_excluding_itself() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        let first = f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        f.svc.create(f.booking(station, 14, 16)).await.unwrap();

        // Moving within its own slot only overlaps itself.
        let moved = f
            .svc
            .update(first.id, None, change(station, 10, 11))
            .await
            .unwrap();
        assert_eq!(moved.end_reservation, at(11));

        let err = f
            .svc
            .update(first.id, None, change(station, 15, 17))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn update_without_recheck_skips_admission() {
        let mut f = Fixture::new().await;
        f.svc = ReservationService::new(f.repos.clone(), StationLocks::new())
            .with_recheck_on_update(false);
        let station = f.station(Some(1)).await;
        let first = f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        f.svc.create(f.booking(station, 14, 16)).await.unwrap();

        f.svc
            .update(first.id, None, change(station, 15, 17))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_to_missing_station_is_not_found() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        let r = f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        let err = f
            .svc
            .update(r.id, None, change(404, 10, 12))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn capacity_is_read_under_the_station_lock() {
        let f = Fixture::new().await;
        let station = f.station(Some(2)).await;
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();

        let guard = f.locks.acquire(station).await;
        let booking = f.booking(station, 11, 13);
        let svc = Arc::new(f.svc);
        let pending = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.create(booking).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        // Capacity drops while the booking waits for the lock.
        let smaller = ChargingStationDraft {
            address_id: None,
            number_of_spaces: Some(1),
        };
        let stations = f.repos.charging_stations();
        stations.update(station, smaller).await.unwrap();
        drop(guard);

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded { .. }));
        assert_eq!(svc.get_all(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reservation_removed_before_the_write_reads_as_missing() {
        let f = Fixture::new().await;
        let station = f.station(None).await;
        let r = f.svc.create(f.booking(station, 10, 12)).await.unwrap();

        f.repos.reservations.inner.delete(r.id).await.unwrap();
        *f.repos.reservations.stale.lock().unwrap() = Some(r.clone());

        let err = f.svc.delete(r.id, None).await.unwrap_err();
        assert_eq!(err.to_string(), NO_SUCH_RESERVATION);

        let err = f
            .svc
            .update(r.id, None, change(station, 13, 14))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), NO_SUCH_RESERVATION);
    }

    #[tokio::test]
    async fn scope_hides_other_users_reservations() {
        let f = Fixture::new().await;
        let station = f.station(None).await;
        let r = f.svc.create(f.booking(station, 10, 12)).await.unwrap();
        let stranger = f.user_id + 1;

        let err = f.svc.get_by_id(r.id, Some(stranger)).await.unwrap_err();
        assert_eq!(err.to_string(), NO_SUCH_RESERVATION);
        assert!(f.svc.get_all(Some(stranger)).await.unwrap().is_empty());
        assert!(f.svc.delete(r.id, Some(stranger)).await.is_err());

        assert_eq!(f.svc.get_by_id(r.id, Some(f.user_id)).await.unwrap(), r);
        f.svc.delete(r.id, Some(f.user_id)).await.unwrap();
        assert!(f.svc.get_by_id(r.id, None).await.is_err());
    }

    #[tokio::test]
    async fn list_by_user_requires_the_user() {
        let f = Fixture::new().await;
        let station = f.station(None).await;
        f.svc.create(f.booking(station, 10, 12)).await.unwrap();

        assert_eq!(f.svc.list_by_user(f.user_id).await.unwrap().len(), 1);
        let err = f.svc.list_by_user(f.user_id + 50).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bookings_never_overbook() {
        let f = Fixture::new().await;
        let station = f.station(Some(1)).await;
        let svc = Arc::new(f.svc);

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            let booking = Booking {
                charging_station_id: station,
                user_id: f.user_id,
                start: at(10),
                end: at(12),
            };
            tasks.push(tokio::spawn(async move { svc.create(booking).await }));
        }

        let mut admitted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(e) => assert!(matches!(e, DomainError::CapacityExceeded { .. })),
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(svc.get_all(None).await.unwrap().len(), 1);
    }
}
