//! Tests for the account service.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;
use zeroize::Zeroizing;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockTokenRepository, MockUserRepository, PrefixedIdGenerator};

fn make_service(users: MockUserRepository, tokens: MockTokenRepository) -> AccountService {
    AccountService::new(
        Arc::new(users),
        Arc::new(tokens),
        Arc::new(PrefixedIdGenerator::new("acct-")),
        Arc::new(DefaultClock),
        TokenKey::new("0123456789abcdef"),
    )
}

fn stored_user(status: UserStatus) -> User {
    let now = Utc::now();
    User {
        id: "u-1".to_owned(),
        email: "amina@example.com".to_owned(),
        phone: "+254711000000".to_owned(),
        password_hash: hash_password("password123").expect("hash"),
        first_name: "Amina".to_owned(),
        last_name: "Otieno".to_owned(),
        role: Role::User,
        status,
        county: Some("Kisumu".to_owned()),
        town: None,
        bio: None,
        rating: 0.0,
        is_email_verified: true,
        is_phone_verified: true,
        created_at: now,
        updated_at: now,
    }
}

fn registration() -> Registration {
    Registration {
        email: " Amina@Example.com ".to_owned(),
        phone: "+254711000000".to_owned(),
        password: Zeroizing::new("password123".to_owned()),
        first_name: "Amina".to_owned(),
        last_name: "Otieno".to_owned(),
    }
}

#[tokio::test]
async fn register_creates_pending_user() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users.expect_find_by_phone().returning(|_| Ok(None));
    users.expect_insert().times(1).returning(|_| Ok(()));

    let user = make_service(users, MockTokenRepository::new())
        .register(registration())
        .await
        .expect("registration");
    assert_eq!(user.email, "amina@example.com");
    assert_eq!(user.status, UserStatus::Pending);
    assert_eq!(user.role, Role::User);
    assert!(user.id.starts_with("acct-"));
    assert!(verify_password("password123", &user.password_hash));
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(stored_user(UserStatus::Active))));

    let err = make_service(users, MockTokenRepository::new())
        .register(registration())
        .await
        .expect_err("duplicate");
    assert_eq!(err.message(), "User with this email already exists");
}

#[tokio::test]
async fn register_rejects_taken_phone() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users
        .expect_find_by_phone()
        .returning(|_| Ok(Some(stored_user(UserStatus::Active))));

    let err = make_service(users, MockTokenRepository::new())
        .register(registration())
        .await
        .expect_err("duplicate");
    assert_eq!(err.message(), "User with this phone already exists");
}

#[tokio::test]
async fn login_issues_token() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email == "amina@example.com")
        .returning(|_| Ok(Some(stored_user(UserStatus::Active))));
    let mut tokens = MockTokenRepository::new();
    tokens
        .expect_insert()
        .withf(|token| token.user_id == "u-1" && token.token_hash.len() == 64)
        .times(1)
        .returning(|_| Ok(()));

    let password = Zeroizing::new("password123".to_owned());
    let session = make_service(users, tokens)
        .login("AMINA@example.com", &password)
        .await
        .expect("login");
    assert_eq!(session.user.id, "u-1");
    assert_eq!(session.token.len(), 64);
    assert!(session.expires_at > Utc::now());
}

#[rstest]
#[case("wrong-password", UserStatus::Active, ErrorCode::Unauthorized)]
#[case("password123", UserStatus::Suspended, ErrorCode::Forbidden)]
#[tokio::test]
async fn login_failures(
    #[case] password: &str,
    #[case] status: UserStatus,
    #[case] expected: ErrorCode,
) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(stored_user(status))));

    let password = Zeroizing::new(password.to_owned());
    let err = make_service(users, MockTokenRepository::new())
        .login("amina@example.com", &password)
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn login_with_unknown_email_is_unauthorized() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    let password = Zeroizing::new("password123".to_owned());
    let err = make_service(users, MockTokenRepository::new())
        .login("nobody@example.com", &password)
        .await
        .expect_err("unknown");
    assert_eq!(err.message(), "Invalid credentials");
}

#[tokio::test]
async fn refresh_requires_bearer_token() {
    let principal = Principal::new("u-1", Role::User);
    let err = make_service(MockUserRepository::new(), MockTokenRepository::new())
        .refresh(&principal)
        .await
        .expect_err("no token");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn refresh_revokes_old_token() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Ok(Some(stored_user(UserStatus::Active))));
    let key = TokenKey::new("0123456789abcdef");
    let old_digest = key.digest("old-token");
    let mut tokens = MockTokenRepository::new();
    tokens
        .expect_revoke()
        .withf(move |hash| hash == old_digest)
        .times(1)
        .returning(|_| Ok(true));
    tokens.expect_insert().times(1).returning(|_| Ok(()));

    let principal = Principal::new("u-1", Role::User).with_bearer_token("old-token");
    let session = make_service(users, tokens)
        .refresh(&principal)
        .await
        .expect("refresh");
    assert_ne!(session.token, "old-token");
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let actor = Principal::new("admin-1", Role::Admin);
    let err = make_service(MockUserRepository::new(), MockTokenRepository::new())
        .delete_user(&actor, "admin-1")
        .await
        .expect_err("self delete");
    assert_eq!(err.message(), "Cannot delete your own account");
}

#[tokio::test]
async fn deleting_unknown_user_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_delete().returning(|_| Ok(false));
    let actor = Principal::new("admin-1", Role::Admin);
    let err = make_service(users, MockTokenRepository::new())
        .delete_user(&actor, "ghost")
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case("superuser")]
#[case("")]
#[tokio::test]
async fn set_role_rejects_unknown_roles(#[case] role: &str) {
    let err = make_service(MockUserRepository::new(), MockTokenRepository::new())
        .set_role("u-1", role)
        .await
        .expect_err("invalid role");
    assert_eq!(err.message(), "Invalid role");
}

#[tokio::test]
async fn set_status_updates_account() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Ok(Some(stored_user(UserStatus::Pending))));
    users
        .expect_update()
        .withf(|user| user.status == UserStatus::Suspended)
        .returning(|_| Ok(true));
    let user = make_service(users, MockTokenRepository::new())
        .set_status("u-1", "suspended")
        .await
        .expect("status change");
    assert_eq!(user.status, UserStatus::Suspended);
}

#[tokio::test]
async fn store_outage_surfaces_as_database_error() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Err(PersistenceError::connection("database connection is closed")));
    let err = make_service(users, MockTokenRepository::new())
        .profile("u-1")
        .await
        .expect_err("closed store");
    assert_eq!(err.code(), ErrorCode::DatabaseUnavailable);
    assert!(err.message().contains("database"));
}
