use crate::handlers;
use crate::middleware::auth::{auth_middleware, optional_auth_middleware};
use crate::services::upload::MAX_UPLOAD_BODY;
use axum::{extract::DefaultBodyLimit, middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let auth = auth_routes();
    let public = public_routes().layer(middleware::from_fn(optional_auth_middleware));
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    auth.merge(public).merge(protected)
}

/// Sign-in and token exchange.
fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/refresh",
            routing::post(handlers::auth::refresh_token),
        )
}

/// Reads open to everybody; the viewer is attached when known, since post
/// detail and profiles show more to authors.
fn public_routes() -> Router {
    Router::new()
        .route("/posts", routing::get(handlers::post::index))
        .route(
            "/posts/{post_id}",
            routing::get(handlers::post::post_detail),
        )
        .route(
            "/category/{slug}",
            routing::get(handlers::post::category_posts),
        )
        .route(
            "/profile/{username}",
            routing::get(handlers::user::profile),
        )
}

/// Everything that needs a signed-in user.
fn protected_routes() -> Router {
    Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        // Posts
        .route(
            "/posts/create",
            routing::get(handlers::post::create_post_form).post(handlers::post::create_post),
        )
        .route(
            "/posts/{post_id}/edit",
            routing::get(handlers::post::edit_post_form).post(handlers::post::edit_post),
        )
        .route(
            "/posts/{post_id}/delete",
            routing::get(handlers::post::delete_post_form).post(handlers::post::delete_post),
        )
        // Comments
        .route(
            "/posts/{post_id}/comment",
            routing::get(handlers::comment::add_comment_form)
                .post(handlers::comment::add_comment),
        )
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}",
            routing::get(handlers::comment::edit_comment_form)
                .post(handlers::comment::edit_comment),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}",
            routing::get(handlers::comment::delete_comment_form)
                .post(handlers::comment::delete_comment),
        )
        // Profile
        .route(
            "/profile/edit",
            routing::get(handlers::user::edit_profile_form).post(handlers::user::edit_profile),
        )
        // Upload
        .route(
            "/upload/image",
            routing::post(handlers::upload::upload_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        // Categories and locations (admin only - checked in handler)
        .route(
            "/admin/categories",
            routing::get(handlers::category::list_categories)
                .post(handlers::category::create_category),
        )
        .route(
            "/admin/categories/{id}",
            routing::put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        .route(
            "/admin/locations",
            routing::get(handlers::location::list_locations)
                .post(handlers::location::create_location),
        )
        .route(
            "/admin/locations/{id}",
            routing::put(handlers::location::update_location)
                .delete(handlers::location::delete_location),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Extension,
    };
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    // Requests without credentials never reach the database.
    fn app() -> Router {
        create_routes().layer(Extension(DatabaseConnection::Disconnected))
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn writes_require_sign_in() {
        for (method, uri) in [
            ("GET", "/api/v1/posts/create"),
            ("POST", "/api/v1/posts/create"),
            ("POST", "/api/v1/posts/1/edit"),
            ("POST", "/api/v1/posts/1/delete"),
            ("POST", "/api/v1/posts/1/comment"),
            ("GET", "/api/v1/posts/1/edit_comment/2"),
            ("GET", "/api/v1/profile/edit"),
            ("POST", "/api/v1/upload/image"),
            ("GET", "/api/v1/admin/categories"),
            ("GET", "/api/v1/auth/me"),
        ] {
            assert_eq!(
                status_of(method, uri).await,
                StatusCode::UNAUTHORIZED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        assert_eq!(status_of("GET", "/api/v1/nowhere").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("GET", "/posts").await, StatusCode::NOT_FOUND);
    }
}
