pub mod auth;
pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod upload;
pub mod user;

pub use auth::*;

use crate::error::{AppError, AppResult};
use axum::{
    body::Bytes,
    response::{IntoResponse, Redirect, Response},
};
use serde::de::DeserializeOwned;

pub fn post_detail_path(post_id: i32) -> String {
    format!("/api/v1/posts/{post_id}")
}

pub fn profile_path(username: &str) -> String {
    format!("/api/v1/profile/{username}")
}

/// 303 See Other to `path`.
pub fn redirect_to(path: &str) -> Response {
    Redirect::to(path).into_response()
}

/// Someone other than the author tried to change a post or one of its
/// comments: send them back to the post without touching anything.
pub fn redirect_not_author(post_id: i32, user_id: i32, action: &str) -> Response {
    tracing::debug!(post_id, user_id, action, "Not the author, redirecting to post");
    redirect_to(&post_detail_path(post_id))
}

/// Decode a JSON form body. Owner-gated handlers call this only after the
/// ownership check. An empty body is an empty form, so missing fields
/// surface as field errors; any other undecodable body is a 400.
pub fn parse_form<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid form body: {e}")))
}
