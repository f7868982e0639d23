use crate::error::{AppError, AppResult, FieldErrors};
use crate::handlers::comment::{CommentForm, CommentResponse};
use crate::handlers::user::AuthorSummary;
use crate::handlers::{parse_form, post_detail_path, profile_path, redirect_not_author, redirect_to};
use crate::middleware::auth::{viewer_id, AuthUser};
use crate::models::{CategoryModel, LocationModel, PostModel};
use crate::policy::{can_modify, is_visible};
use crate::response::{ApiResponse, PageQuery, PaginatedResponse, POSTS_PER_PAGE};
use crate::services::post::{PostCard, PostInput, PostPage};
use crate::services::upload::is_uploaded_image_path;
use crate::services::{CategoryService, CommentService, LocationService, PostService, UserService};
use crate::utils::datetime::{format_datetime, parse_datetime};
use crate::utils::validation::{self, REQUIRED};
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

/// Post form. `author` is not a field: the author is whoever submits the
/// form, and an `author` key in the body is ignored.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct PostForm {
    /// Title (up to 256 characters)
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 256, message = "Ensure this value has at most 256 characters")
    )]
    pub title: String,
    /// Body text
    #[validate(custom(function = "validation::not_blank"))]
    pub text: String,
    /// Publication date and time, e.g. `2024-05-17T09:30`. A future value
    /// schedules the post.
    pub pub_date: String,
    /// Category ID
    pub category: Option<i32>,
    /// Location ID
    pub location: Option<i32>,
    /// Defaults to true
    pub is_published: Option<bool>,
    /// Path returned by the image upload endpoint
    pub image: Option<String>,
}

impl PostForm {
    fn blank() -> Self {
        Self {
            is_published: Some(true),
            ..Default::default()
        }
    }

    /// Validate the submitted values and turn them into model input.
    pub fn clean(self) -> AppResult<PostInput> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let pub_date = if self.pub_date.trim().is_empty() {
            errors.add("pub_date", REQUIRED);
            None
        } else {
            let parsed = parse_datetime(&self.pub_date);
            if parsed.is_none() {
                errors.add("pub_date", "Enter a valid date/time");
            }
            parsed
        };

        let image = self
            .image
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty());
        if image.as_deref().is_some_and(|path| !is_uploaded_image_path(path)) {
            errors.add("image", "Upload a valid image");
        }

        match pub_date {
            Some(pub_date) if errors.is_empty() => Ok(PostInput {
                title: self.title.trim().to_string(),
                text: self.text.trim().to_string(),
                pub_date,
                category_id: self.category,
                location_id: self.location,
                is_published: self.is_published.unwrap_or(true),
                image,
            }),
            _ => Err(AppError::Form(errors)),
        }
    }
}

impl From<&PostModel> for PostForm {
    fn from(post: &PostModel) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: format_datetime(&post.pub_date),
            category: post.category_id,
            location: post.location_id,
            is_published: Some(post.is_published),
            image: post.image.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChoiceResponse {
    pub id: i32,
    pub label: String,
}

impl From<CategoryModel> for ChoiceResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            label: c.title,
        }
    }
}

impl From<LocationModel> for ChoiceResponse {
    fn from(l: LocationModel) -> Self {
        Self {
            id: l.id,
            label: l.name,
        }
    }
}

/// A post form together with the choices its select fields offer.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostFormPage {
    pub form: PostForm,
    pub categories: Vec<ChoiceResponse>,
    pub locations: Vec<ChoiceResponse>,
}

async fn form_page(db: &DatabaseConnection, form: PostForm) -> AppResult<PostFormPage> {
    let categories = CategoryService::new(db.clone()).list().await?;
    let locations = LocationService::new(db.clone()).list().await?;
    Ok(PostFormPage {
        form,
        categories: categories.into_iter().map(Into::into).collect(),
        locations: locations.into_iter().map(Into::into).collect(),
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID
    pub id: i32,
    pub title: String,
    pub text: String,
    /// Publication date and time (UTC)
    pub pub_date: String,
    pub is_published: bool,
    /// Public path of the attached image
    pub image: Option<String>,
    pub created_at: String,
    pub author: Option<AuthorSummary>,
    pub category: Option<CategorySummary>,
    pub location: Option<LocationSummary>,
    /// Number of comments on the post
    pub comment_count: u64,
}

impl From<PostCard> for PostResponse {
    fn from(card: PostCard) -> Self {
        let p = card.post;
        Self {
            id: p.id,
            title: p.title,
            text: p.text,
            pub_date: format_datetime(&p.pub_date),
            is_published: p.is_published,
            image: p.image,
            created_at: format_datetime(&p.created_at),
            author: card.author.map(AuthorSummary::from),
            category: card.category.map(|c| CategorySummary {
                id: c.id,
                title: c.title,
                slug: c.slug,
            }),
            location: card.location.map(|l| LocationSummary {
                id: l.id,
                name: l.name,
            }),
            comment_count: card.comment_count,
        }
    }
}

pub(crate) fn page_response(page: PostPage) -> PaginatedResponse<PostResponse> {
    PaginatedResponse::new(
        page.cards.into_iter().map(PostResponse::from).collect(),
        page.total,
        page.page,
        POSTS_PER_PAGE,
    )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    /// Oldest first
    pub comments: Vec<CommentResponse>,
    /// Empty form for a new comment
    pub comment_form: CommentForm,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryPostsResponse {
    pub category: CategorySummary,
    pub posts: PaginatedResponse<PostResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Published posts, newest first", body = PaginatedResponse<PostResponse>),
    ),
    tag = "posts"
)]
pub async fn index(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now().naive_utc();
    let page = PostService::new(db)
        .list_published(now, query.number())
        .await?;
    Ok(ApiResponse::ok(page_response(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailResponse),
        (status = 404, description = "Post not found or not visible", body = AppError),
    ),
    tag = "posts"
)]
pub async fn post_detail(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: Option<AuthUser>,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db.clone());
    let (post, category) = service.get_with_category(post_id).await?;

    let now = chrono::Utc::now().naive_utc();
    if !is_visible(&post, category.as_ref(), viewer_id(auth_user), now) {
        return Err(AppError::NotFound);
    }

    let card = service.load_card(post).await?;
    let comments = CommentService::new(db).list_by_post(post_id).await?;

    Ok(ApiResponse::ok(PostDetailResponse {
        post: card.into(),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
        comment_form: CommentForm::default(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/category/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Category and its published posts", body = CategoryPostsResponse),
        (status = 404, description = "Unknown or unpublished category", body = AppError),
    ),
    tag = "posts"
)]
pub async fn category_posts(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryService::new(db.clone())
        .get_published_by_slug(&slug)
        .await?;

    let now = chrono::Utc::now().naive_utc();
    let page = PostService::new(db)
        .list_by_category(category.id, now, query.number())
        .await?;

    Ok(ApiResponse::ok(CategoryPostsResponse {
        category: CategorySummary {
            id: category.id,
            title: category.title,
            slug: category.slug,
        },
        posts: page_response(page),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/create",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Empty post form", body = PostFormPage),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post_form(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(form_page(&db, PostForm::blank()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/create",
    security(("jwt_token" = [])),
    request_body = PostForm,
    responses(
        (status = 303, description = "Created, redirects to the author's profile"),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    body: Bytes,
) -> AppResult<Response> {
    let input = parse_form::<PostForm>(&body)?.clean()?;
    let author = UserService::new(db.clone())
        .get_by_id(auth_user.user_id)
        .await?;

    PostService::new(db).create(author.id, input).await?;
    Ok(redirect_to(&profile_path(&author.username)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/edit",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post form filled with current values", body = PostFormPage),
        (status = 303, description = "Not the author, redirects to the post"),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn edit_post_form(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<Response> {
    let post = PostService::new(db.clone()).get_by_id(post_id).await?;
    if !can_modify(&post, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post.id, auth_user.user_id, "edit post"));
    }

    let page = form_page(&db, PostForm::from(&post)).await?;
    Ok(ApiResponse::ok(page).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/edit",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    request_body = PostForm,
    responses(
        (status = 303, description = "Saved (or not the author), redirects to the post"),
        (status = 400, description = "Validation failed", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn edit_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
    body: Bytes,
) -> AppResult<Response> {
    let service = PostService::new(db);
    let post = service.get_by_id(post_id).await?;
    if !can_modify(&post, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post.id, auth_user.user_id, "edit post"));
    }

    let input = parse_form::<PostForm>(&body)?.clean()?;
    let post = service.update(post, input).await?;
    Ok(redirect_to(&post_detail_path(post.id)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/delete",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "The post about to be deleted", body = PostFormPage),
        (status = 303, description = "Not the author, redirects to the post"),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post_form(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<Response> {
    let post = PostService::new(db.clone()).get_by_id(post_id).await?;
    if !can_modify(&post, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post.id, auth_user.user_id, "delete post"));
    }

    let page = form_page(&db, PostForm::from(&post)).await?;
    Ok(ApiResponse::ok(page).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/delete",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 303, description = "Deleted (redirects to the author's profile) or not the author (redirects to the post)"),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<Response> {
    let service = PostService::new(db.clone());
    let post = service.get_by_id(post_id).await?;
    if !can_modify(&post, Some(auth_user.user_id)) {
        return Ok(redirect_not_author(post.id, auth_user.user_id, "delete post"));
    }

    service.delete(post.id).await?;
    let author = UserService::new(db).get_by_id(auth_user.user_id).await?;
    Ok(redirect_to(&profile_path(&author.username)))
}
