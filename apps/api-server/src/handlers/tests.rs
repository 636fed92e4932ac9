use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use agora_infra::{JwtConfig, JwtTokenService};
use agora_shared::dto::AuthResponse;

use super::configure_routes;
use crate::state::AppState;

fn state() -> AppState {
    AppState::in_memory(Arc::new(JwtTokenService::new(JwtConfig::default())))
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await
    };
}

macro_rules! register {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"email": $email, "password": "correct-horse"}))
            .to_request();
        let auth: AuthResponse = test::call_and_read_body_json(&$app, req).await;
        auth.access_token
    }};
}

#[actix_web::test]
async fn test_health() {
    let app = app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_requires_bearer_token() {
    let app = app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_new_account_is_read_only() {
    let app = app!();
    let token = register!(app, "reader@example.com");

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["level"], 0);
    assert_eq!(profile["capabilities"]["create_post"], false);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({"content": "hello", "publish": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["status"], 403);
    assert_eq!(problem["title"], "Forbidden");
    assert_eq!(problem["type"], "urn:agora:problem:forbidden-action");
}

#[actix_web::test]
async fn test_out_of_range_level_is_unprocessable() {
    let app = app!();
    let token = register!(app, "someone@example.com");

    let req = test::TestRequest::get()
        .uri("/api/users/level/12")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["type"], "urn:agora:problem:invalid-level");
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let app = app!();
    let _ = register!(app, "dup@example.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "DUP@example.com", "password": "correct-horse"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_handle_login_and_account_deletion() {
    let app = app!();
    let token = register!(app, "writer@example.com");
    let bearer = format!("Bearer {token}");

    let req = test::TestRequest::put()
        .uri("/api/profile/handle")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"handle": "@Writer"}))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["handle"], "@writer");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"login": "@writer", "password": "correct-horse"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri("/api/profile")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}
