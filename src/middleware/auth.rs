use crate::{
    error::{AppError, AppResult},
    models::{User, UserModel},
    utils::{
        cookie::{extract_cookie, ACCESS_TOKEN_COOKIE},
        jwt::{user_id_from_token, TokenKind},
    },
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::convert::Infallible;

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
}

/// Reject the request unless it carries a valid access token for an
/// existing user.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = resolve_viewer(&db, &headers)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Attach the viewer when the request carries a valid access token, and
/// let anonymous requests through untouched.
pub async fn optional_auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(auth_user) = resolve_viewer(&db, &headers).await? {
        request.extensions_mut().insert(auth_user);
    }
    Ok(next.run(request).await)
}

async fn resolve_viewer(
    db: &DatabaseConnection,
    headers: &HeaderMap,
) -> AppResult<Option<AuthUser>> {
    // Authorization: Bearer wins over the HttpOnly cookie.
    let Some(token) =
        extract_bearer_token(headers).or_else(|| extract_cookie(headers, ACCESS_TOKEN_COOKIE))
    else {
        return Ok(None);
    };

    let Some(user_id) = user_id_from_token(&token, TokenKind::Access) else {
        tracing::debug!("Ignoring invalid access token");
        return Ok(None);
    };

    // Tokens of deleted accounts do not authenticate anybody.
    let exists = User::find_by_id(user_id).one(db).await?.is_some();
    Ok(exists.then_some(AuthUser { user_id }))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Load the current user and make sure they are an administrator.
pub async fn require_admin(db: &DatabaseConnection, auth_user: &AuthUser) -> AppResult<UserModel> {
    let user = User::find_by_id(auth_user.user_id)
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().copied())
    }
}

/// The viewer id the content policies expect.
pub fn viewer_id(auth_user: Option<AuthUser>) -> Option<i32> {
    auth_user.map(|u| u.user_id)
}
