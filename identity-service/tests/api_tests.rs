mod common;

use common::cookie_value;
use common::set_cookies;
use common::TestApp;
use identity_service::domain::identity::models::SessionPolicy;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_login_me_logout_scenario() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "Secret123!").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["role"], "USER");
    assert!(body["id"].is_string());
    let id = body["id"].clone();

    let response = app.login("a@x.com", "Secret123!").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("sr_at=")));
    assert!(cookies.iter().any(|c| c.starts_with("sr_rt=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "message": "ok" }));

    let response = app.get("/auth/me").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "id": id, "email": "a@x.com", "role": "USER" }));

    let response = app.post("/auth/logout").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "message": "logged out" }));

    let response = app.get("/auth/me").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("a@x.com", "Secret123!").await;
    let response = app.register("a@x.com", "Other456!").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 409);
    assert_eq!(body["error"], "Conflict");
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_register_explicit_admin_role() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({ "email": "root@x.com", "password": "Secret123!", "role": "ADMIN" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "ADMIN");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::spawn().await;

    let invalid_bodies = [
        json!({ "email": "not-an-email", "password": "Secret123!" }),
        json!({ "email": "a@x.com", "password": "short" }),
        json!({ "email": "a@x.com", "password": "a".repeat(129) }),
        json!({ "email": "a@x.com", "password": "Secret123!", "role": "ROOT" }),
        json!({ "email": "a@x.com" }),
    ];

    for body in invalid_bodies {
        let response = app
            .post("/auth/register")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let error: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert_eq!(error["status_code"], 400);
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;

    let wrong_password = app.login("a@x.com", "Wrong123!").await;
    let unknown_email = app.login("nobody@x.com", "Secret123!").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&wrong_password).is_empty());

    let wrong_password_body = wrong_password.bytes().await.unwrap();
    let unknown_email_body = unknown_email.bytes().await.unwrap();
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn test_login_email_is_case_sensitive() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;

    let response = app.login("A@x.com", "Secret123!").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_validation_errors() {
    let app = TestApp::spawn().await;

    let response = app.login("not-an-email", "Secret123!").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.login("a@x.com", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = TestApp::spawn().await;

    let response = app.post("/auth/refresh").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_tampered_cookie() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .post(app.url("/auth/refresh"))
        .header(COOKIE, "sr_rt=not-a-valid-jwt")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_previous_token() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;

    let login = app.login("a@x.com", "Secret123!").await;
    let first_refresh = cookie_value(&login, "sr_rt").expect("Missing refresh cookie");

    let response = app.post("/auth/refresh").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let second_refresh = cookie_value(&response, "sr_rt").expect("Missing refresh cookie");
    assert!(cookie_value(&response, "sr_at").is_some());
    assert_ne!(first_refresh, second_refresh);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "message": "refreshed" }));

    let replay = reqwest::Client::new()
        .post(app.url("/auth/refresh"))
        .header(COOKIE, format!("sr_rt={}", first_refresh))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    // The session itself is still alive
    let response = app.get("/auth/me").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;

    let login = app.login("a@x.com", "Secret123!").await;
    let refresh_token = cookie_value(&login, "sr_rt").expect("Missing refresh cookie");

    let response = app.post("/auth/logout").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = reqwest::Client::new()
        .post(app.url("/auth/refresh"))
        .header(COOKIE, format!("sr_rt={}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_with_refresh_cookie_only_revokes() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;

    let login = app.login("a@x.com", "Secret123!").await;
    let refresh_token = cookie_value(&login, "sr_rt").expect("Missing refresh cookie");
    let refresh_cookie = format!("sr_rt={}", refresh_token);

    let response = reqwest::Client::new()
        .post(app.url("/auth/logout"))
        .header(COOKIE, &refresh_cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = reqwest::Client::new()
        .post(app.url("/auth/refresh"))
        .header(COOKIE, &refresh_cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_twice_clears_cookies_both_times() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;
    app.login("a@x.com", "Secret123!").await;

    for _ in 0..2 {
        let response = app.post("/auth/logout").send().await.expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("sr_at=;")));
        assert!(cookies.iter().any(|c| c.starts_with("sr_rt=;")));
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }
}

#[tokio::test]
async fn test_me_with_tampered_access_cookie() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .get(app.url("/auth/me"))
        .header(COOKIE, "sr_at=not-a-valid-jwt")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 401);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "Secret123!").await;

    let login = app.login("a@x.com", "Secret123!").await;
    let refresh_token = cookie_value(&login, "sr_rt").expect("Missing refresh cookie");

    let response = reqwest::Client::new()
        .get(app.url("/auth/me"))
        .header(COOKIE, format!("sr_at={}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotation_with_version_bump_retires_old_access_token() {
    let app = TestApp::spawn_with(SessionPolicy {
        rotation_bumps_token_version: true,
        verify_access_token_version: true,
    })
    .await;
    app.register("a@x.com", "Secret123!").await;

    let login = app.login("a@x.com", "Secret123!").await;
    let old_access = cookie_value(&login, "sr_at").expect("Missing access cookie");

    let response = app.post("/auth/refresh").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = reqwest::Client::new()
        .get(app.url("/auth/me"))
        .header(COOKIE, format!("sr_at={}", old_access))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/auth/me").send().await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}
