use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::auth::{AuthService, RegisterInput, TokenPair};
use crate::utils::cookie::{
    build_auth_cookie, build_clear_cookie, extract_cookie, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use crate::utils::datetime::format_datetime;
use crate::utils::jwt::{access_token_expiry_seconds, refresh_token_expiry_seconds};
use crate::utils::validation;
use anyhow::anyhow;
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    /// Username (3-150 characters, letters, digits and @/./+/-/_)
    #[validate(
        custom(function = "validation::username"),
        length(min = 3, max = 150, message = "Username must be 3 to 150 characters long")
    )]
    pub username: String,
    /// Email address
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(max = 150))]
    pub first_name: String,
    #[validate(length(max = 150))]
    pub last_name: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token
    pub token: String,
    /// JWT refresh token
    pub refresh_token: String,
    pub user_id: i32,
    pub username: String,
}

impl AuthResponse {
    fn new(user: UserModel, tokens: &TokenPair) -> Self {
        Self {
            token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            user_id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `user` or `admin`
    pub role: String,
    pub created_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: format_datetime(&user.created_at),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered and signed in", body = AuthResponse),
        (status = 400, description = "Validation failed or username taken", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = AuthService::new(db);
    let (user, tokens) = service
        .register(RegisterInput {
            username: payload.username.trim().to_string(),
            email: payload.email.trim().to_string(),
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            password: payload.password,
        })
        .await?;

    let mut response =
        ApiResponse::with_message(AuthResponse::new(user, &tokens), "Registration successful.".to_string())
            .into_response();
    set_auth_cookies(&mut response, &tokens)?;
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let (user, tokens) = service.login(&payload.username, &payload.password).await?;

    let mut response = ApiResponse::ok(AuthResponse::new(user, &tokens)).into_response();
    set_auth_cookies(&mut response, &tokens)?;
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let user = service.get_user_by_id(auth_user.user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// Refresh token; the `refresh_token` cookie is used when absent
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// New JWT access token
    pub token: String,
    /// New JWT refresh token
    pub refresh_token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    payload: Option<Json<RefreshTokenRequest>>,
) -> AppResult<impl IntoResponse> {
    let refresh_token = payload
        .and_then(|Json(body)| body.refresh_token)
        .or_else(|| extract_cookie(&headers, REFRESH_TOKEN_COOKIE))
        .ok_or(AppError::Unauthorized)?;

    let tokens = AuthService::new(db).refresh(&refresh_token).await?;

    let mut response = ApiResponse::ok(TokenResponse {
        token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone(),
    })
    .into_response();
    set_auth_cookies(&mut response, &tokens)?;
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Logout successful", body = String),
    ),
    tag = "auth"
)]
pub async fn logout() -> AppResult<impl IntoResponse> {
    let mut response = ApiResponse::ok("Logout successful").into_response();
    append_set_cookie(&mut response, &build_clear_cookie(ACCESS_TOKEN_COOKIE))?;
    append_set_cookie(&mut response, &build_clear_cookie(REFRESH_TOKEN_COOKIE))?;
    Ok(response)
}

fn set_auth_cookies(response: &mut Response, tokens: &TokenPair) -> AppResult<()> {
    append_set_cookie(
        response,
        &build_auth_cookie(
            ACCESS_TOKEN_COOKIE,
            &tokens.access_token,
            access_token_expiry_seconds(),
        ),
    )?;
    append_set_cookie(
        response,
        &build_auth_cookie(
            REFRESH_TOKEN_COOKIE,
            &tokens.refresh_token,
            refresh_token_expiry_seconds(),
        ),
    )
}

fn append_set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie_value).map_err(|e| {
        AppError::Internal(anyhow!("Failed to build Set-Cookie header value: {}", e))
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
