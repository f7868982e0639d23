#![allow(dead_code)]

use blogicum::config::upload::UploadConfig;
use blogicum::models::{category, comment, location, post, CategoryModel, CommentModel, LocationModel, PostModel};
use chrono::{Duration, NaiveDateTime, Utc};
use reqwest::{redirect, Client, Response};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};
use tokio::sync::OnceCell;

static INIT: Once = Once::new();
static MIGRATED: OnceCell<()> = OnceCell::const_new();
static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Keep bcrypt cheap in tests
        std::env::set_var("BCRYPT_COST", "4");
        let config = blogicum::config::jwt::JwtConfig::from_env().unwrap();
        let _ = blogicum::utils::jwt::init_jwt_config(config);
    });
}

/// Name that no other test (or earlier run against the same database) uses.
/// Tests share one database and run concurrently, so nothing is truncated.
pub fn unique(prefix: &str) -> String {
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, &nonce[..8], counter)
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    MIGRATED
        .get_or_init(|| async {
            blogicum::migration::Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    let upload_config = UploadConfig {
        upload_dir: std::env::temp_dir()
            .join("blogicum_test_uploads")
            .to_string_lossy()
            .into_owned(),
    };

    let app = axum::Router::new()
        .merge(blogicum::routes::create_routes())
        .nest_service(
            UploadConfig::PUBLIC_PREFIX,
            tower_http::services::ServeDir::new(&upload_config.upload_dir),
        )
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    // Redirects are part of what the handlers answer; never follow them.
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client,
    }
}

/// Register a user through the API.
pub async fn create_test_user(app: &TestApp, prefix: &str) -> TestUser {
    let username = unique(prefix);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@test.com", username),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "Failed to register user '{}': status={}, body={}",
        username,
        status,
        body
    );

    TestUser {
        id: body["data"]["user_id"].as_i64().unwrap() as i32,
        username,
        token: body["data"]["token"].as_str().unwrap().to_string(),
    }
}

/// Make a user admin by directly updating the database.
pub async fn make_admin(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = 'admin' WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to make user admin");
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn hours_ago(hours: i64) -> NaiveDateTime {
    now() - Duration::hours(hours)
}

pub fn hours_ahead(hours: i64) -> NaiveDateTime {
    now() + Duration::hours(hours)
}

pub async fn create_category(db: &DatabaseConnection, is_published: bool) -> CategoryModel {
    let slug = unique("cat").replace('_', "-");
    category::ActiveModel {
        title: sea_orm::ActiveValue::Set(format!("Category {slug}")),
        description: sea_orm::ActiveValue::Set("About things".to_string()),
        slug: sea_orm::ActiveValue::Set(slug),
        is_published: sea_orm::ActiveValue::Set(is_published),
        created_at: sea_orm::ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create category")
}

pub async fn create_location(db: &DatabaseConnection) -> LocationModel {
    location::ActiveModel {
        name: sea_orm::ActiveValue::Set(unique("place")),
        is_published: sea_orm::ActiveValue::Set(true),
        created_at: sea_orm::ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create location")
}

pub struct NewPost {
    pub author_id: i32,
    pub category_id: Option<i32>,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
}

pub async fn create_post(db: &DatabaseConnection, new: NewPost) -> PostModel {
    post::ActiveModel {
        title: sea_orm::ActiveValue::Set(unique("post")),
        text: sea_orm::ActiveValue::Set("Some text".to_string()),
        pub_date: sea_orm::ActiveValue::Set(new.pub_date),
        author_id: sea_orm::ActiveValue::Set(new.author_id),
        location_id: sea_orm::ActiveValue::Set(None),
        category_id: sea_orm::ActiveValue::Set(new.category_id),
        is_published: sea_orm::ActiveValue::Set(new.is_published),
        image: sea_orm::ActiveValue::Set(None),
        created_at: sea_orm::ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create post")
}

/// A post everybody can see.
pub async fn create_public_post(db: &DatabaseConnection, author_id: i32) -> PostModel {
    let category = create_category(db, true).await;
    create_post(
        db,
        NewPost {
            author_id,
            category_id: Some(category.id),
            pub_date: hours_ago(1),
            is_published: true,
        },
    )
    .await
}

pub async fn create_comment(
    db: &DatabaseConnection,
    post_id: i32,
    author_id: i32,
    text: &str,
) -> CommentModel {
    comment::ActiveModel {
        text: sea_orm::ActiveValue::Set(text.to_string()),
        created_at: sea_orm::ActiveValue::Set(now()),
        author_id: sea_orm::ActiveValue::Set(author_id),
        post_id: sea_orm::ActiveValue::Set(post_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create comment")
}

pub fn location_of(resp: &Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}
