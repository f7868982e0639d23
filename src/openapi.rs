use crate::handlers;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth routes
        handlers::register,
        handlers::login,
        handlers::auth::refresh_token,
        handlers::get_current_user,
        handlers::auth::logout,
        // Post routes
        handlers::post::index,
        handlers::post::post_detail,
        handlers::post::category_posts,
        handlers::post::create_post_form,
        handlers::post::create_post,
        handlers::post::edit_post_form,
        handlers::post::edit_post,
        handlers::post::delete_post_form,
        handlers::post::delete_post,
        // Comment routes
        handlers::comment::add_comment_form,
        handlers::comment::add_comment,
        handlers::comment::edit_comment_form,
        handlers::comment::edit_comment,
        handlers::comment::delete_comment_form,
        handlers::comment::delete_comment,
        // Profile routes
        handlers::user::profile,
        handlers::user::edit_profile_form,
        handlers::user::edit_profile,
        // Upload routes
        handlers::upload::upload_image,
        // Admin routes
        handlers::category::list_categories,
        handlers::category::create_category,
        handlers::category::update_category,
        handlers::category::delete_category,
        handlers::location::list_locations,
        handlers::location::create_location,
        handlers::location::update_location,
        handlers::location::delete_location,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PageQuery,
            crate::error::AppError,
            // Auth
            handlers::auth::RegisterRequest,
            handlers::auth::LoginRequest,
            handlers::auth::RefreshTokenRequest,
            handlers::auth::AuthResponse,
            handlers::auth::TokenResponse,
            handlers::auth::UserResponse,
            // Posts
            handlers::post::PostForm,
            handlers::post::PostFormPage,
            handlers::post::ChoiceResponse,
            handlers::post::PostResponse,
            handlers::post::PostDetailResponse,
            handlers::post::CategoryPostsResponse,
            handlers::post::CategorySummary,
            handlers::post::LocationSummary,
            // Comments
            handlers::comment::CommentForm,
            handlers::comment::CommentFormPage,
            handlers::comment::CommentResponse,
            // Profiles
            handlers::user::AuthorSummary,
            handlers::user::ProfileUser,
            handlers::user::ProfileResponse,
            handlers::user::ProfileForm,
            // Upload
            handlers::upload::UploadResponse,
            // Admin
            handlers::category::CategoryForm,
            handlers::category::CategoryResponse,
            handlers::location::LocationForm,
            handlers::location::LocationResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and tokens"),
        (name = "posts", description = "Post listings, detail and authoring"),
        (name = "comments", description = "Comments on posts"),
        (name = "users", description = "User profiles"),
        (name = "upload", description = "Post image upload"),
        (name = "admin", description = "Category and location management"),
    )
)]
pub struct ApiDoc;

/// Registers the `jwt_token` bearer scheme the protected routes refer to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
