//! SeaORM implementation of ChargingStationRepository

use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use tracing::debug;

use crate::domain::charging_station::{
    ChargingStation, ChargingStationDraft, ChargingStationRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::charging_station;

pub struct SeaOrmChargingStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmChargingStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn row(&self, id: i32) -> Result<Option<charging_station::Model>, DbErr> {
        charging_station::Entity::find_by_id(id).one(&self.db).await
    }
}

fn model_to_domain(m: charging_station::Model) -> ChargingStation {
    ChargingStation {
        id: m.id,
        address_id: m.address_id,
        number_of_spaces: m.number_of_spaces,
    }
}

#[async_trait]
impl ChargingStationRepository for SeaOrmChargingStationRepository {
    async fn find_all(&self) -> DomainResult<Vec<ChargingStation>> {
        let models = charging_station::Entity::find()
            .order_by_asc(charging_station::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ChargingStation>> {
        Ok(self.row(id).await?.map(model_to_domain))
    }

    async fn create(&self, draft: ChargingStationDraft) -> DomainResult<ChargingStation> {
        let model = charging_station::ActiveModel {
            id: NotSet,
            address_id: Set(draft.address_id),
            number_of_spaces: Set(draft.number_of_spaces),
        };
        let inserted = model.insert(&self.db).await?;
        debug!(station_id = inserted.id, "Charging station created");
        Ok(model_to_domain(inserted))
    }

    async fn update(&self, id: i32, draft: ChargingStationDraft) -> DomainResult<ChargingStation> {
        let Some(existing) = self.row(id).await? else {
            return Err(DomainError::not_found("ChargingStation", id));
        };

        let mut active: charging_station::ActiveModel = existing.into();
        active.address_id = Set(draft.address_id);
        active.number_of_spaces = Set(draft.number_of_spaces);
        let updated = active.update(&self.db).await?;
        Ok(model_to_domain(updated))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = charging_station::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ChargingStation", id));
        }
        Ok(())
    }
}
