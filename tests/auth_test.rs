mod common;

use serde_json::Value;

#[tokio::test]
async fn register_then_me() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "reg").await;

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], user.id);
    assert_eq!(body["data"]["username"], user.username.as_str());
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn duplicate_username_is_a_field_error() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "dup").await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": user.username,
            "email": "someone@test.com",
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["username"].is_array());
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let app = common::spawn_app().await;
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["username"].is_array());
    assert!(body["fields"]["password"].is_array());
}

#[tokio::test]
async fn login_checks_password() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "login").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": user.username,
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": user.username,
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let cookies: Vec<String> = resp
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["user_id"], user.id);

    // Cookie authentication works without the Authorization header.
    let access = body["data"]["token"].as_str().unwrap();
    let resp = app
        .client
        .get(app.url("/auth/me"))
        .header(reqwest::header::COOKIE, format!("access_token={}", access))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn refresh_issues_new_pair() {
    let app = common::spawn_app().await;
    let username = common::unique("refresh");
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": "r@test.com",
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let access = body["data"]["token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let new_access = body["data"]["token"].as_str().unwrap();

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(new_access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // An access token is not a refresh token, and vice versa.
    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": access }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(&refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn logout_clears_cookies() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "logout").await;

    let resp = app
        .client
        .post(app.url("/auth/logout"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let cleared = resp
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter(|v| v.to_str().unwrap().contains("Max-Age=0"))
        .count();
    assert_eq!(cleared, 2);
}

#[tokio::test]
async fn route_segment_username_is_refused() {
    let app = common::spawn_app().await;
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": "edit",
            "email": "edit@test.com",
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fields"]["username"][0], "This username is not available");
}
