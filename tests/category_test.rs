mod common;

use blogicum::models::{category, Category, Post};
use common::{NewPost, TestApp, TestUser};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;

async fn admin(app: &TestApp) -> TestUser {
    let user = common::create_test_user(app, "admin").await;
    common::make_admin(&app.db, user.id).await;
    user
}

#[tokio::test]
async fn admin_manages_categories() {
    let app = common::spawn_app().await;
    let admin = admin(&app).await;
    let slug = common::unique("travel").replace('_', "-");

    let resp = app
        .client
        .post(app.url("/admin/categories"))
        .bearer_auth(&admin.token)
        .json(&serde_json::json!({
            "title": "Travel",
            "description": "Trips and places",
            "slug": slug,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["is_published"], true);

    let resp = app
        .client
        .put(app.url(&format!("/admin/categories/{}", id)))
        .bearer_auth(&admin.token)
        .json(&serde_json::json!({
            "title": "Journeys",
            "description": "Trips and places",
            "slug": slug,
            "is_published": false,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Journeys");

    // Unpublished categories do not resolve by slug.
    let resp = app
        .client
        .get(app.url(&format!("/category/{}", slug)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .delete(app.url(&format!("/admin/categories/{}", id)))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn duplicate_slug_is_a_field_error() {
    let app = common::spawn_app().await;
    let admin = admin(&app).await;
    let existing = common::create_category(&app.db, true).await;

    let resp = app
        .client
        .post(app.url("/admin/categories"))
        .bearer_auth(&admin.token)
        .json(&serde_json::json!({
            "title": "Copycat",
            "description": "Same slug",
            "slug": existing.slug,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert!(body["fields"]["slug"].is_array());

    let count = Category::find()
        .filter(category::Column::Slug.eq(existing.slug.as_str()))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn regular_users_cannot_manage_categories() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "plain").await;

    let resp = app
        .client
        .post(app.url("/admin/categories"))
        .bearer_auth(&user.token)
        .json(&serde_json::json!({
            "title": "Mine",
            "description": "Mine",
            "slug": common::unique("mine").replace('_', "-"),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app.client.get(app.url("/admin/locations")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn category_listing_filters_and_paginates() {
    let app = common::spawn_app().await;
    let author = common::create_test_user(&app, "catlist").await;
    let category = common::create_category(&app.db, true).await;

    let mut visible = Vec::new();
    for i in 0..12 {
        let post = common::create_post(
            &app.db,
            NewPost {
                author_id: author.id,
                category_id: Some(category.id),
                pub_date: common::hours_ago(i + 1),
                is_published: true,
            },
        )
        .await;
        visible.push(post.id);
    }
    common::create_post(
        &app.db,
        NewPost {
            author_id: author.id,
            category_id: Some(category.id),
            pub_date: common::hours_ago(1),
            is_published: false,
        },
    )
    .await;
    common::create_post(
        &app.db,
        NewPost {
            author_id: author.id,
            category_id: Some(category.id),
            pub_date: common::hours_ahead(1),
            is_published: true,
        },
    )
    .await;

    let resp = app
        .client
        .get(app.url(&format!("/category/{}", category.slug)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["category"]["slug"], category.slug.as_str());
    assert_eq!(body["data"]["posts"]["total"], 12);
    assert_eq!(body["data"]["posts"]["total_pages"], 2);
    let ids: Vec<i64> = body["data"]["posts"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    let expected: Vec<i64> = visible.iter().take(10).map(|&id| id as i64).collect();
    assert_eq!(ids, expected);

    // Past the end means the last page.
    let resp = app
        .client
        .get(app.url(&format!("/category/{}?page=99", category.slug)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["posts"]["page"], 2);
    assert_eq!(body["data"]["posts"]["items"].as_array().unwrap().len(), 2);

    let resp = app
        .client
        .get(app.url("/category/no-such-category"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn deleting_category_or_location_keeps_posts() {
    let app = common::spawn_app().await;
    let admin = admin(&app).await;
    let author = common::create_test_user(&app, "survivor").await;
    let post = common::create_public_post(&app.db, author.id).await;
    let category_id = post.category_id.unwrap();

    let resp = app
        .client
        .post(app.url("/admin/locations"))
        .bearer_auth(&admin.token)
        .json(&serde_json::json!({ "name": "Riverside" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let location_id = body["data"]["id"].as_i64().unwrap() as i32;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/edit", post.id)))
        .bearer_auth(&author.token)
        .json(&serde_json::json!({
            "title": post.title,
            "text": post.text,
            "pub_date": "2024-01-01T10:00",
            "category": category_id,
            "location": location_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);

    for path in [
        format!("/admin/categories/{}", category_id),
        format!("/admin/locations/{}", location_id),
    ] {
        let resp = app
            .client
            .delete(app.url(&path))
            .bearer_auth(&admin.token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "{path}");
    }

    let stored = Post::find_by_id(post.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(stored.category_id, None);
    assert_eq!(stored.location_id, None);

    // Without a category the post is no longer public, but its author still
    // sees it.
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post.id)))
        .bearer_auth(&author.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .delete(app.url(&format!("/admin/categories/{}", category_id)))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
