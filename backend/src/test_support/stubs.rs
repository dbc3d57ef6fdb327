//! Canned handlers for areas without a production implementation.
//!
//! Chamas, wallets, reminders, avatar upload and the email/phone/password
//! auth flows answer with fixed success envelopes so suites can exercise
//! their routes and the shared middleware.

use actix_web::{HttpResponse, web};
use serde_json::{Value, json};

use crate::inbound::http::envelope::{created, ok, ok_with_message};

const CHAMA_ID: &str = "test-chama-123";
const WALLET_ID: &str = "test-wallet-123";
const REMINDER_ID: &str = "test-reminder-123";

fn page(total: u64) -> Value {
    json!({ "total": total, "limit": 20, "offset": 0 })
}

fn chama(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Umoja Savings Group",
        "type": "savings",
        "county": "Nairobi",
        "contributionAmount": 1000.0,
        "contributionFrequency": "monthly",
        "memberCount": 12,
    })
}

async fn list_chamas() -> HttpResponse {
    ok(json!({ "chamas": [chama(CHAMA_ID)], "pagination": page(1) }))
}

async fn create_chama(body: web::Json<Value>) -> HttpResponse {
    let mut created_chama = chama(CHAMA_ID);
    if let (Some(target), Some(name)) = (created_chama.as_object_mut(), body.get("name")) {
        target.insert("name".to_owned(), name.clone());
    }
    created(json!({ "chama": created_chama }), "Chama created successfully")
}

async fn get_chama(id: web::Path<String>) -> HttpResponse {
    ok(json!({ "chama": chama(&id) }))
}

async fn update_chama(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "chama": chama(&id) }), "Chama updated successfully")
}

async fn delete_chama(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "id": id.as_str() }), "Chama deleted successfully")
}

async fn join_chama(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "chamaId": id.as_str() }), "Joined chama successfully")
}

async fn leave_chama(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "chamaId": id.as_str() }), "Left chama successfully")
}

async fn chama_members(id: web::Path<String>) -> HttpResponse {
    ok(json!({
        "chamaId": id.as_str(),
        "members": [{ "userId": "test-user-123", "role": "chairperson" }],
        "pagination": page(1),
    }))
}

/// `/chamas` collection, items and membership actions.
pub fn configure_chamas(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/chamas")
            .route(web::get().to(list_chamas))
            .route(web::post().to(create_chama)),
    )
    .service(web::resource("/chamas/{id}/join").route(web::post().to(join_chama)))
    .service(web::resource("/chamas/{id}/leave").route(web::post().to(leave_chama)))
    .service(web::resource("/chamas/{id}/members").route(web::get().to(chama_members)))
    .service(
        web::resource("/chamas/{id}")
            .route(web::get().to(get_chama))
            .route(web::put().to(update_chama))
            .route(web::delete().to(delete_chama)),
    );
}

fn wallet(id: &str) -> Value {
    json!({ "id": id, "type": "personal", "balance": 5000.0, "currency": "KES" })
}

async fn list_wallets() -> HttpResponse {
    ok(json!({ "wallets": [wallet(WALLET_ID)] }))
}

async fn get_wallet(id: web::Path<String>) -> HttpResponse {
    ok(json!({ "wallet": wallet(&id) }))
}

async fn wallet_balance(id: web::Path<String>) -> HttpResponse {
    ok(json!({ "walletId": id.as_str(), "balance": 5000.0, "currency": "KES" }))
}

async fn wallet_transactions(id: web::Path<String>) -> HttpResponse {
    ok(json!({ "walletId": id.as_str(), "transactions": [], "pagination": page(0) }))
}

async fn transfer() -> HttpResponse {
    ok_with_message(json!({ "status": "completed" }), "Transfer completed successfully")
}

async fn deposit() -> HttpResponse {
    ok_with_message(json!({ "status": "pending" }), "Deposit initiated successfully")
}

async fn withdraw() -> HttpResponse {
    ok_with_message(json!({ "status": "pending" }), "Withdrawal initiated successfully")
}

/// `/wallets` reads and money movements.
pub fn configure_wallets(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/wallets").route(web::get().to(list_wallets)))
        .service(web::resource("/wallets/transfer").route(web::post().to(transfer)))
        .service(web::resource("/wallets/deposit").route(web::post().to(deposit)))
        .service(web::resource("/wallets/withdraw").route(web::post().to(withdraw)))
        .service(web::resource("/wallets/{id}/balance").route(web::get().to(wallet_balance)))
        .service(
            web::resource("/wallets/{id}/transactions").route(web::get().to(wallet_transactions)),
        )
        .service(web::resource("/wallets/{id}").route(web::get().to(get_wallet)));
}

fn reminder(id: &str, enabled: bool) -> Value {
    json!({ "id": id, "title": "Monthly contribution", "type": "monthly", "isEnabled": enabled })
}

async fn list_reminders() -> HttpResponse {
    ok(json!({ "reminders": [reminder(REMINDER_ID, true)], "pagination": page(1) }))
}

async fn create_reminder() -> HttpResponse {
    created(
        json!({ "reminder": reminder(REMINDER_ID, true) }),
        "Reminder created successfully",
    )
}

async fn get_reminder(id: web::Path<String>) -> HttpResponse {
    ok(json!({ "reminder": reminder(&id, true) }))
}

async fn update_reminder(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "reminder": reminder(&id, true) }), "Reminder updated successfully")
}

async fn delete_reminder(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "id": id.as_str() }), "Reminder deleted successfully")
}

async fn toggle_reminder(id: web::Path<String>) -> HttpResponse {
    ok_with_message(json!({ "reminder": reminder(&id, false) }), "Reminder toggled")
}

/// `/reminders` CRUD plus toggle.
pub fn configure_reminders(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/reminders")
            .route(web::get().to(list_reminders))
            .route(web::post().to(create_reminder)),
    )
    .service(web::resource("/reminders/{id}/toggle").route(web::put().to(toggle_reminder)))
    .service(
        web::resource("/reminders/{id}")
            .route(web::get().to(get_reminder))
            .route(web::put().to(update_reminder))
            .route(web::delete().to(delete_reminder)),
    );
}

async fn forgot_password() -> HttpResponse {
    ok_with_message(json!({ "sent": true }), "Password reset email sent")
}

async fn reset_password() -> HttpResponse {
    ok_with_message(json!({ "reset": true }), "Password reset successfully")
}

async fn verify_email() -> HttpResponse {
    ok_with_message(json!({ "verified": true }), "Email verified successfully")
}

async fn verify_phone() -> HttpResponse {
    ok_with_message(json!({ "verified": true }), "Phone verified successfully")
}

async fn test_email() -> HttpResponse {
    ok_with_message(json!({ "sent": true }), "Test email sent")
}

/// Email, phone and password-reset flows under `/auth`.
pub fn configure_auth_flows(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/forgot-password").route(web::post().to(forgot_password)))
        .service(web::resource("/auth/reset-password").route(web::post().to(reset_password)))
        .service(web::resource("/auth/verify-email").route(web::post().to(verify_email)))
        .service(web::resource("/auth/verify-phone").route(web::post().to(verify_phone)))
        .service(web::resource("/auth/test-email").route(web::post().to(test_email)));
}

async fn upload_avatar() -> HttpResponse {
    ok_with_message(
        json!({ "avatarUrl": "/uploads/avatars/test-user-123.png" }),
        "Avatar uploaded successfully",
    )
}

/// `POST /users/avatar`.
pub fn configure_avatar(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users/avatar").route(web::post().to(upload_avatar)));
}
