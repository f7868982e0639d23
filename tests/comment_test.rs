mod common;

use blogicum::models::Comment;
use blogicum::services::CommentService;
use blogicum::AppError;
use sea_orm::EntityTrait;
use serde_json::Value;

#[tokio::test]
async fn add_comment_redirects_to_post() {
    let app = common::spawn_app().await;
    let author = common::create_test_user(&app, "poster").await;
    let reader = common::create_test_user(&app, "reader").await;
    let post = common::create_public_post(&app.db, author.id).await;
    let url = app.url(&format!("/posts/{}/comment", post.id));

    let resp = app.client.get(&url).bearer_auth(&reader.token).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["form"]["text"], "");

    let resp = app
        .client
        .post(&url)
        .bearer_auth(&reader.token)
        .json(&serde_json::json!({ "text": "Great post" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(
        common::location_of(&resp),
        format!("/api/v1/posts/{}", post.id)
    );

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post.id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Great post");
    assert_eq!(comments[0]["author"]["id"], reader.id);
}

#[tokio::test]
async fn comment_needs_text_login_and_post() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "commenter").await;
    let post = common::create_public_post(&app.db, user.id).await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comment", post.id)))
        .bearer_auth(&user.token)
        .json(&serde_json::json!({ "text": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["text"].is_array());

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comment", post.id)))
        .json(&serde_json::json!({ "text": "anonymous" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comment", i32::MAX)))
        .bearer_auth(&user.token)
        .json(&serde_json::json!({ "text": "into the void" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn other_user_cannot_delete_comment() {
    let app = common::spawn_app().await;
    let alice = common::create_test_user(&app, "alice").await;
    let bob = common::create_test_user(&app, "bob").await;
    let post = common::create_public_post(&app.db, alice.id).await;
    let comment = common::create_comment(&app.db, post.id, alice.id, "mine").await;
    let url = app.url(&format!("/posts/{}/delete_comment/{}", post.id, comment.id));

    for resp in [
        app.client.get(&url).bearer_auth(&bob.token).send().await.unwrap(),
        app.client.post(&url).bearer_auth(&bob.token).send().await.unwrap(),
    ] {
        assert_eq!(resp.status(), 303);
        assert_eq!(
            common::location_of(&resp),
            format!("/api/v1/posts/{}", post.id)
        );
    }

    let stored = Comment::find_by_id(comment.id).one(&app.db).await.unwrap();
    assert_eq!(stored, Some(comment));
}

#[tokio::test]
async fn other_user_cannot_edit_comment() {
    let app = common::spawn_app().await;
    let alice = common::create_test_user(&app, "alice").await;
    let bob = common::create_test_user(&app, "bob").await;
    let post = common::create_public_post(&app.db, alice.id).await;
    let comment = common::create_comment(&app.db, post.id, alice.id, "original").await;
    let url = app.url(&format!("/posts/{}/edit_comment/{}", post.id, comment.id));

    let resp = app.client.get(&url).bearer_auth(&bob.token).send().await.unwrap();
    assert_eq!(resp.status(), 303);

    let resp = app
        .client
        .post(&url)
        .bearer_auth(&bob.token)
        .body("definitely not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);

    let stored = Comment::find_by_id(comment.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn author_edits_and_deletes_comment() {
    let app = common::spawn_app().await;
    let alice = common::create_test_user(&app, "alice").await;
    let post = common::create_public_post(&app.db, alice.id).await;
    let comment = common::create_comment(&app.db, post.id, alice.id, "typo").await;
    let edit_url = app.url(&format!("/posts/{}/edit_comment/{}", post.id, comment.id));

    let resp = app.client.get(&edit_url).bearer_auth(&alice.token).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["form"]["text"], "typo");

    let resp = app
        .client
        .post(&edit_url)
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "text": "fixed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    let stored = Comment::find_by_id(comment.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(stored.text, "fixed");
    assert_eq!(stored.created_at, comment.created_at);

    let delete_url = app.url(&format!("/posts/{}/delete_comment/{}", post.id, comment.id));
    let resp = app.client.post(&delete_url).bearer_auth(&alice.token).send().await.unwrap();
    assert_eq!(resp.status(), 303);
    assert!(Comment::find_by_id(comment.id).one(&app.db).await.unwrap().is_none());
}

#[tokio::test]
async fn comment_addressed_through_wrong_post_is_not_found() {
    let app = common::spawn_app().await;
    let alice = common::create_test_user(&app, "alice").await;
    let post = common::create_public_post(&app.db, alice.id).await;
    let elsewhere = common::create_public_post(&app.db, alice.id).await;
    let comment = common::create_comment(&app.db, post.id, alice.id, "here").await;

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/edit_comment/{}", elsewhere.id, comment.id)))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn missing_post_wins_over_undecodable_body() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "garbled").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comment", i32::MAX)))
        .bearer_auth(&user.token)
        .body("text=plain+form")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let post = common::create_public_post(&app.db, user.id).await;
    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comment", post.id)))
        .bearer_auth(&user.token)
        .body("text=plain+form")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deleting_a_missing_comment_is_not_found() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "eraser").await;
    let post = common::create_public_post(&app.db, user.id).await;
    let comment = common::create_comment(&app.db, post.id, user.id, "once").await;

    let service = CommentService::new(app.db.clone());
    service.delete(comment.id).await.unwrap();
    assert!(matches!(
        service.delete(comment.id).await,
        Err(AppError::NotFound)
    ));
}
