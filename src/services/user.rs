use crate::{
    error::{unique_violation_as_field, AppError, AppResult, FieldErrors},
    models::{user, User, UserModel},
    services::auth::USERNAME_TAKEN,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Save the profile form. Renaming onto somebody else's username is a
    /// validation error on `username`.
    pub async fn update_profile(
        &self,
        existing: UserModel,
        input: ProfileInput,
    ) -> AppResult<UserModel> {
        let taken = User::find()
            .filter(user::Column::Username.eq(input.username.as_str()))
            .filter(user::Column::Id.ne(existing.id))
            .count(&self.db)
            .await?
            > 0;
        if taken {
            return Err(AppError::Form(FieldErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        active.username = sea_orm::ActiveValue::Set(input.username);
        active.first_name = sea_orm::ActiveValue::Set(input.first_name);
        active.last_name = sea_orm::ActiveValue::Set(input.last_name);
        active.email = sea_orm::ActiveValue::Set(input.email);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| unique_violation_as_field(e, "username", USERNAME_TAKEN))?;
        tracing::info!(user_id = updated.id, "Profile updated");
        Ok(updated)
    }
}
