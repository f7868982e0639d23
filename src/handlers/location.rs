use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::LocationModel;
use crate::response::ApiResponse;
use crate::services::location::{LocationInput, LocationService};
use crate::utils::datetime::format_datetime;
use crate::utils::validation;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LocationForm {
    /// Place name (up to 256 characters)
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 256, message = "Ensure this value has at most 256 characters")
    )]
    pub name: String,
    /// Defaults to true
    pub is_published: Option<bool>,
}

impl LocationForm {
    pub fn clean(self) -> AppResult<LocationInput> {
        self.validate()?;
        Ok(LocationInput {
            name: self.name.trim().to_string(),
            is_published: self.is_published.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    pub id: i32,
    pub name: String,
    pub is_published: bool,
    pub created_at: String,
}

impl From<LocationModel> for LocationResponse {
    fn from(l: LocationModel) -> Self {
        Self {
            id: l.id,
            name: l.name,
            is_published: l.is_published,
            created_at: format_datetime(&l.created_at),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/locations",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "All locations", body = Vec<LocationResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_locations(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let locations = LocationService::new(db).list().await?;
    let items: Vec<LocationResponse> = locations.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/locations",
    security(("jwt_token" = [])),
    request_body = LocationForm,
    responses(
        (status = 200, description = "Location created", body = LocationResponse),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn create_location(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(form): Json<LocationForm>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let input = form.clean()?;
    let location = LocationService::new(db).create(input).await?;
    Ok(ApiResponse::ok(LocationResponse::from(location)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/locations/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = LocationForm,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Location not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn update_location(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(form): Json<LocationForm>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let input = form.clean()?;
    let location = LocationService::new(db).update(id, input).await?;
    Ok(ApiResponse::ok(LocationResponse::from(location)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/locations/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Location not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn delete_location(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    LocationService::new(db).delete(id).await?;
    Ok(ApiResponse::ok("Location deleted"))
}
