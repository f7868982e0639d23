use crate::error::{AppError, AppResult};
use crate::handlers::user::AuthorSummary;
use crate::handlers::{parse_form, post_detail_path, redirect_not_author, redirect_to};
use crate::middleware::AuthUser;
use crate::models::{CommentModel, UserModel};
use crate::policy::can_modify;
use crate::response::ApiResponse;
use crate::services::{CommentService, PostService};
use crate::utils::datetime::format_datetime;
use crate::utils::validation;
use axum::{
    body::Bytes,
    extract::Path,
    response::{IntoResponse, Response},
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CommentForm {
    /// Comment text
    #[validate(custom(function = "validation::not_blank"))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(self) -> AppResult<String> {
        self.validate()?;
        Ok(self.text.trim().to_string())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    /// Comment ID
    pub id: i32,
    pub post_id: i32,
    pub text: String,
    pub created_at: String,
    pub author: Option<AuthorSummary>,
}

impl From<(CommentModel, Option<UserModel>)> for CommentResponse {
    fn from((comment, author): (CommentModel, Option<UserModel>)) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            text: comment.text,
            created_at: format_datetime(&comment.created_at),
            author: author.map(AuthorSummary::from),
        }
    }
}

/// A comment form, filled in when an existing comment is being edited.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentFormPage {
    pub post_id: i32,
    pub comment_id: Option<i32>,
    pub form: CommentForm,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comment",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Empty comment form", body = CommentFormPage),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn add_comment_form(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let post = PostService::new(db).get_by_id(post_id).await?;
    Ok(ApiResponse::ok(CommentFormPage {
        post_id: post.id,
        comment_id: None,
        form: CommentForm::default(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/comment",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    request_body = CommentForm,
    responses(
        (status = 303, description = "Comment added, redirects to the post"),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn add_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
    body: Bytes,
) -> AppResult<Response> {
    let post = PostService::new(db.clone()).get_by_id(post_id).await?;
    let text = parse_form::<CommentForm>(&body)?.clean()?;

    let comment = CommentService::new(db)
        .create(post.id, auth_user.user_id, &text)
        .await?;
    tracing::debug!(post_id, comment_id = comment.id, "Comment added");
    Ok(redirect_to(&post_detail_path(post.id)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/edit_comment/{comment_id}",
    security(("jwt_token" = [])),
    params(
        ("post_id" = i32, Path, description = "Post ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "Comment form filled with the current text", body = CommentFormPage),
        (status = 303, description = "Not the author, redirects to the post"),
        (status = 404, description = "No such comment on this post", body = AppError),
    ),
    tag = "comments"
)]
pub async fn edit_comment_form(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path((post_id, comment_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let comment = CommentService::new(db)
        .get_in_post(comment_id, post_id)
        .await?;
    if !can_modify(&comment, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post_id, auth_user.user_id, "edit comment"));
    }

    Ok(ApiResponse::ok(CommentFormPage {
        post_id,
        comment_id: Some(comment.id),
        form: CommentForm { text: comment.text },
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/edit_comment/{comment_id}",
    security(("jwt_token" = [])),
    params(
        ("post_id" = i32, Path, description = "Post ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    request_body = CommentForm,
    responses(
        (status = 303, description = "Saved (or not the author), redirects to the post"),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 404, description = "No such comment on this post", body = AppError),
    ),
    tag = "comments"
)]
pub async fn edit_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path((post_id, comment_id)): Path<(i32, i32)>,
    body: Bytes,
) -> AppResult<Response> {
    let service = CommentService::new(db);
    let comment = service.get_in_post(comment_id, post_id).await?;
    if !can_modify(&comment, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post_id, auth_user.user_id, "edit comment"));
    }

    let text = parse_form::<CommentForm>(&body)?.clean()?;
    service.update(comment, &text).await?;
    Ok(redirect_to(&post_detail_path(post_id)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/delete_comment/{comment_id}",
    security(("jwt_token" = [])),
    params(
        ("post_id" = i32, Path, description = "Post ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "The comment about to be deleted", body = CommentResponse),
        (status = 303, description = "Not the author, redirects to the post"),
        (status = 404, description = "No such comment on this post", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment_form(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path((post_id, comment_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let comment = CommentService::new(db)
        .get_in_post(comment_id, post_id)
        .await?;
    if !can_modify(&comment, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post_id, auth_user.user_id, "delete comment"));
    }

    Ok(ApiResponse::ok(CommentResponse::from((comment, None))).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/delete_comment/{comment_id}",
    security(("jwt_token" = [])),
    params(
        ("post_id" = i32, Path, description = "Post ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 303, description = "Deleted (or not the author), redirects to the post"),
        (status = 404, description = "No such comment on this post", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path((post_id, comment_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let service = CommentService::new(db);
    let comment = service.get_in_post(comment_id, post_id).await?;
    if !can_modify(&comment, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post_id, auth_user.user_id, "delete comment"));
    }

    service.delete(comment.id).await?;
    Ok(redirect_to(&post_detail_path(post_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed() {
        let form = CommentForm {
            text: "  nice photo \n".to_string(),
        };
        assert_eq!(form.clean().unwrap(), "nice photo");
    }

    #[test]
    fn blank_text_is_a_field_error() {
        let err = CommentForm {
            text: " ".to_string(),
        }
        .clean()
        .unwrap_err();
        match err {
            AppError::Form(errors) => assert!(errors.get("text").is_some()),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn missing_text_key_is_an_empty_form() {
        let form: CommentForm = serde_json::from_str("{}").unwrap();
        assert!(form.clean().is_err());
    }
}
