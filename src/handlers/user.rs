use crate::error::{AppError, AppResult};
use crate::handlers::post::{page_response, PostResponse};
use crate::handlers::{parse_form, profile_path, redirect_to};
use crate::middleware::auth::{viewer_id, AuthUser};
use crate::models::UserModel;
use crate::policy::{profile_scope, ProfileScope};
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::user::ProfileInput;
use crate::services::{PostService, UserService};
use crate::utils::datetime::format_datetime;
use crate::utils::validation;
use axum::{
    body::Bytes,
    extract::{Path, Query},
    response::{IntoResponse, Response},
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// How a user is shown next to their posts and comments.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: i32,
    pub username: String,
}

impl From<UserModel> for AuthorSummary {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileUser {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Registration time
    pub date_joined: String,
}

impl From<UserModel> for ProfileUser {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: format_datetime(&user.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: ProfileUser,
    /// Whether the viewer is looking at their own profile
    pub is_owner: bool,
    pub posts: PaginatedResponse<PostResponse>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ProfileForm {
    /// Letters, digits and @/./+/-/_ only (up to 150 characters)
    #[validate(
        custom(function = "validation::username"),
        length(max = 150, message = "Ensure this value has at most 150 characters")
    )]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters"))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters"))]
    pub last_name: String,
    /// Email address, may be left empty
    #[validate(custom(function = "validation::email_or_empty"))]
    pub email: String,
}

impl ProfileForm {
    pub fn clean(self) -> AppResult<ProfileInput> {
        self.validate()?;
        Ok(ProfileInput {
            username: self.username.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
        })
    }
}

impl From<&UserModel> for ProfileForm {
    fn from(user: &UserModel) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/profile/{username}",
    params(
        ("username" = String, Path, description = "Username"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Profile with the user's posts", body = ProfileResponse),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: Option<AuthUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let user = UserService::new(db.clone())
        .get_by_username(&username)
        .await?;

    let scope = profile_scope(user.id, viewer_id(auth_user));
    let now = chrono::Utc::now().naive_utc();
    let page = PostService::new(db)
        .list_by_author(user.id, scope, now, query.number())
        .await?;

    Ok(ApiResponse::ok(ProfileResponse {
        is_owner: scope == ProfileScope::Owner,
        profile: user.into(),
        posts: page_response(page),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile/edit",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Profile form filled with current values", body = ProfileForm),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn edit_profile_form(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = UserService::new(db).get_by_id(auth_user.user_id).await?;
    Ok(ApiResponse::ok(ProfileForm::from(&user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/profile/edit",
    security(("jwt_token" = [])),
    request_body = ProfileForm,
    responses(
        (status = 303, description = "Saved, redirects to the (possibly renamed) profile"),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn edit_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    body: Bytes,
) -> AppResult<Response> {
    let input = parse_form::<ProfileForm>(&body)?.clean()?;
    let service = UserService::new(db);
    let user = service.get_by_id(auth_user.user_id).await?;

    let user = service.update_profile(user, input).await?;
    Ok(redirect_to(&profile_path(&user.username)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProfileForm {
        ProfileForm {
            username: "ann".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    fn errors_of(result: AppResult<ProfileInput>) -> crate::error::FieldErrors {
        match result {
            Err(AppError::Form(errors)) => errors,
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn valid_profile_cleans() {
        let input = form().clean().unwrap();
        assert_eq!(input.username, "ann");
        assert_eq!(input.email, "ann@example.com");
    }

    #[test]
    fn username_is_required() {
        let f = ProfileForm {
            username: String::new(),
            ..form()
        };
        assert!(errors_of(f.clean()).get("username").is_some());
    }

    #[test]
    fn username_with_slash_is_rejected() {
        let f = ProfileForm {
            username: "ann/lee".to_string(),
            ..form()
        };
        assert!(errors_of(f.clean()).get("username").is_some());
    }

    #[test]
    fn cannot_rename_to_edit() {
        let f = ProfileForm {
            username: "edit".to_string(),
            ..form()
        };
        assert!(errors_of(f.clean()).get("username").is_some());
    }

    #[test]
    fn email_may_be_empty_but_not_malformed() {
        let f = ProfileForm {
            email: String::new(),
            ..form()
        };
        assert!(f.clean().is_ok());

        let f = ProfileForm {
            email: "not-an-address".to_string(),
            ..form()
        };
        assert!(errors_of(f.clean()).get("email").is_some());
    }

    #[test]
    fn overlong_names_are_rejected() {
        let f = ProfileForm {
            first_name: "a".repeat(151),
            ..form()
        };
        assert!(errors_of(f.clean()).get("first_name").is_some());
    }
}
