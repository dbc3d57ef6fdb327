//! Tests for the auth handlers.

use super::*;
use crate::inbound::http::test_utils::{empty_state, member, send};
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::{Value, json};

fn registration(email: &str, phone: &str) -> Value {
    json!({
        "email": email,
        "phone": phone,
        "password": "password123",
        "firstName": "Achieng",
        "lastName": "Odhiambo",
    })
}

async fn register_user(state: &HttpState, email: &str, phone: &str) -> Value {
    let (status, body) = send(
        state,
        None,
        configure,
        TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(registration(email, phone)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["user"].clone()
}

#[actix_web::test]
async fn register_creates_pending_member_without_exposing_hash() {
    let (_store, state) = empty_state().await;
    let user = register_user(&state, "Achieng@Example.com", "+254700000001").await;

    assert_eq!(user["email"], "achieng@example.com");
    assert_eq!(user["status"], "pending");
    assert_eq!(user["role"], "user");
    assert!(user.get("passwordHash").is_none());
}

#[rstest]
#[case(json!({"phone": "+254700000002", "password": "password123", "firstName": "A", "lastName": "B"}), "Email is required")]
#[case(json!({"email": "nope", "phone": "+254700000002", "password": "password123", "firstName": "A", "lastName": "B"}), "Invalid email format")]
#[case(json!({"email": "a@b.co", "phone": "+254700000002", "password": "short", "firstName": "A", "lastName": "B"}), "Password must be at least 8 characters")]
#[case(json!({"email": "a@b.co", "phone": "+254700000002", "password": "password123", "lastName": "B"}), "First name is required")]
#[actix_web::test]
async fn register_rejects_invalid_fields(#[case] body: Value, #[case] message: &str) {
    let (_store, state) = empty_state().await;
    let (status, response) = send(
        &state,
        None,
        configure,
        TestRequest::post().uri("/api/v1/auth/register").set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], message);
}

#[actix_web::test]
async fn duplicate_email_is_rejected() {
    let (_store, state) = empty_state().await;
    register_user(&state, "wanjiku@example.com", "+254700000003").await;
    let (status, body) = send(
        &state,
        None,
        configure,
        TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(registration("wanjiku@example.com", "+254700000004")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User with this email already exists");
}

#[actix_web::test]
async fn login_issues_token_and_rejects_bad_passwords() {
    let (_store, state) = empty_state().await;
    register_user(&state, "kamau@example.com", "+254700000005").await;

    let (status, body) = send(
        &state,
        None,
        configure,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "kamau@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some_and(|t| t.len() == 64));
    assert!(body["data"]["expiresAt"].is_string());

    let (status, body) = send(
        &state,
        None,
        configure,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "kamau@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[actix_web::test]
async fn profile_requires_a_caller() {
    let (_store, state) = empty_state().await;
    let (status, body) = send(
        &state,
        None,
        configure,
        TestRequest::get().uri("/api/v1/auth/profile"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[actix_web::test]
async fn profile_update_applies_fields_and_rejects_blank_names() {
    let (_store, state) = empty_state().await;
    let user = register_user(&state, "njeri@example.com", "+254700000006").await;
    let caller = member(user["id"].as_str().expect("user id"));

    let (status, body) = send(
        &state,
        Some(caller.clone()),
        configure,
        TestRequest::put()
            .uri("/api/v1/auth/profile")
            .set_json(json!({"county": "Kisumu", "bio": "Chama treasurer"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["county"], "Kisumu");

    let (status, body) = send(
        &state,
        Some(caller),
        configure,
        TestRequest::put()
            .uri("/api/v1/auth/profile")
            .set_json(json!({"firstName": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "First name cannot be empty");
}

#[actix_web::test]
async fn malformed_json_uses_the_failure_envelope() {
    let (_store, state) = empty_state().await;
    let (status, body) = send(
        &state,
        None,
        configure,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(body["details"]["code"], "invalid_body");
}
