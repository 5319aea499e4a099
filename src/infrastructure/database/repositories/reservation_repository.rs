//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::reservation::{
    NewReservation, Reservation, ReservationRepository, TimeInterval,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{reservation, user};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: i32) -> DomainResult<Reservation> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }
}

fn model_to_domain((m, owner): (reservation::Model, Option<user::Model>)) -> Reservation {
    Reservation {
        id: m.id,
        charging_station_id: m.charging_station_id,
        user_id: m.user_id,
        username: owner.map(|u| u.username).unwrap_or_default(),
        start_reservation: m.start_reservation,
        end_reservation: m.end_reservation,
    }
}

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    // ── Queries ────────────────────────────────────────────────

    async fn find_all(&self, owner: Option<i32>) -> DomainResult<Vec<Reservation>> {
        let mut query = reservation::Entity::find();
        if let Some(user_id) = owner {
            query = query.filter(reservation::Column::UserId.eq(user_id));
        }
        let rows = query
            .order_by_asc(reservation::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        let row = reservation::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;
        Ok(row.map(model_to_domain))
    }

    async fn count_overlapping(
        &self,
        station_id: i32,
        interval: &TimeInterval,
        exclude: Option<i32>,
    ) -> DomainResult<u64> {
        let mut query = reservation::Entity::find()
            .filter(reservation::Column::ChargingStationId.eq(station_id))
            .filter(reservation::Column::StartReservation.lte(interval.end))
            .filter(reservation::Column::EndReservation.gte(interval.start));
        if let Some(id) = exclude {
            query = query.filter(reservation::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await?)
    }

    // ── Mutations ──────────────────────────────────────────────

    async fn insert(&self, new: NewReservation) -> DomainResult<Reservation> {
        let model = reservation::ActiveModel {
            id: NotSet,
            charging_station_id: Set(new.charging_station_id),
            user_id: Set(new.user_id),
            start_reservation: Set(new.interval.start),
            end_reservation: Set(new.interval.end),
            created_at: Set(Utc::now()),
        };
        let inserted = model.insert(&self.db).await?;
        debug!(
            reservation_id = inserted.id,
            station_id = inserted.charging_station_id,
            "Reservation stored"
        );
        self.load(inserted.id).await
    }

    async fn replace(&self, id: i32, new: NewReservation) -> DomainResult<Reservation> {
        let Some(existing) = reservation::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(DomainError::not_found("Reservation", id));
        };

        let mut active: reservation::ActiveModel = existing.into();
        active.charging_station_id = Set(new.charging_station_id);
        active.user_id = Set(new.user_id);
        active.start_reservation = Set(new.interval.start);
        active.end_reservation = Set(new.interval.end);
        active.update(&self.db).await?;

        self.load(id).await
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = reservation::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Reservation", id));
        }
        Ok(())
    }
}
