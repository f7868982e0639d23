use crate::{
    error::{unique_violation_as_field, AppError, AppResult, FieldErrors},
    models::{user, User, UserModel, ROLE_USER},
    utils::{
        encode_access_token, encode_refresh_token, hash_password,
        jwt::{user_id_from_token, TokenKind},
        verify_password,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists";

/// Fields a new account is created from.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// An access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new user and sign them in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<(UserModel, TokenPair)> {
        if self.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Form(FieldErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            username: sea_orm::ActiveValue::Set(input.username),
            email: sea_orm::ActiveValue::Set(input.email),
            first_name: sea_orm::ActiveValue::Set(input.first_name),
            last_name: sea_orm::ActiveValue::Set(input.last_name),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            role: sea_orm::ActiveValue::Set(ROLE_USER.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let user = new_user
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation_as_field(e, "username", USERNAME_TAKEN))?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        let tokens = issue_tokens(user.id)?;
        Ok((user, tokens))
    }

    /// Unknown usernames and wrong passwords fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(UserModel, TokenPair)> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(username, "Rejected login with wrong password");
            return Err(AppError::Unauthorized);
        }

        let tokens = issue_tokens(user.id)?;
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a fresh pair. The account must still
    /// exist.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let user_id =
            user_id_from_token(refresh_token, TokenKind::Refresh).ok_or(AppError::Unauthorized)?;
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;
        issue_tokens(user.id)
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserModel>> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(user)
    }
}

fn issue_tokens(user_id: i32) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: encode_access_token(user_id)?,
        refresh_token: encode_refresh_token(user_id)?,
    })
}
