use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::CategoryModel;
use crate::response::ApiResponse;
use crate::services::category::{CategoryInput, CategoryService};
use crate::utils::datetime::format_datetime;
use crate::utils::validation;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CategoryForm {
    /// Title (up to 256 characters)
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 256, message = "Ensure this value has at most 256 characters")
    )]
    pub title: String,
    #[validate(custom(function = "validation::not_blank"))]
    pub description: String,
    /// URL identifier: Latin letters, digits, hyphens and underscores
    #[validate(
        custom(function = "validation::slug"),
        length(max = 50, message = "Ensure this value has at most 50 characters")
    )]
    pub slug: String,
    /// Defaults to true
    pub is_published: Option<bool>,
}

impl CategoryForm {
    pub fn clean(self) -> AppResult<CategoryInput> {
        self.validate()?;
        Ok(CategoryInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            slug: self.slug,
            is_published: self.is_published.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            slug: c.slug,
            is_published: c.is_published,
            created_at: format_datetime(&c.created_at),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/categories",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "All categories, published or not", body = Vec<CategoryResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let categories = CategoryService::new(db).list().await?;
    let items: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    security(("jwt_token" = [])),
    request_body = CategoryForm,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation failed or slug taken", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(form): Json<CategoryForm>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let input = form.clean()?;
    let category = CategoryService::new(db).create(input).await?;
    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryForm,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation failed or slug taken", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn update_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(form): Json<CategoryForm>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let input = form.clean()?;
    let category = CategoryService::new(db).update(id, input).await?;
    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted, its posts keep existing without a category", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn delete_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    CategoryService::new(db).delete(id).await?;
    Ok(ApiResponse::ok("Category deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_by_default() {
        let form = CategoryForm {
            title: "Travel".to_string(),
            description: "Trips".to_string(),
            slug: "travel".to_string(),
            is_published: None,
        };
        assert!(form.clean().unwrap().is_published);
    }

    #[test]
    fn slug_with_spaces_is_rejected() {
        let form = CategoryForm {
            title: "Travel".to_string(),
            description: "Trips".to_string(),
            slug: "far away".to_string(),
            is_published: Some(false),
        };
        match form.clean() {
            Err(AppError::Form(errors)) => assert!(errors.get("slug").is_some()),
            other => panic!("expected field errors, got {other:?}"),
        }
    }
}
