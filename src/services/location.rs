use crate::{
    error::{AppError, AppResult},
    models::{location, Location, LocationModel},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder};

#[derive(Debug, Clone, PartialEq)]
pub struct LocationInput {
    pub name: String,
    pub is_published: bool,
}

pub struct LocationService {
    db: DatabaseConnection,
}

impl LocationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<LocationModel>> {
        let locations = Location::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await?;
        Ok(locations)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LocationModel> {
        Location::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, input: LocationInput) -> AppResult<LocationModel> {
        let now = chrono::Utc::now().naive_utc();
        let new_location = location::ActiveModel {
            name: sea_orm::ActiveValue::Set(input.name),
            is_published: sea_orm::ActiveValue::Set(input.is_published),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let location = new_location.insert(&self.db).await?;
        Ok(location)
    }

    pub async fn update(&self, id: i32, input: LocationInput) -> AppResult<LocationModel> {
        let existing = self.get_by_id(id).await?;

        let mut active: location::ActiveModel = existing.into();
        active.name = sea_orm::ActiveValue::Set(input.name);
        active.is_published = sea_orm::ActiveValue::Set(input.is_published);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Posts placed at a deleted location keep existing without one.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Location::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
