//! Success envelope shared by every handler.
//!
//! Successful responses always look like
//! `{"success": true, "data": {...}, "message": "..."}` with `message`
//! omitted when the handler has nothing to add. Failures are rendered by the
//! [`ResponseError`](actix_web::ResponseError) impl in `error.rs`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

/// Wire shape of a successful response.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl<T: Serialize> Success<T> {
    /// Wrap `data` without a message.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// Render with `status`.
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// `200 OK` carrying `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    Success::new(data).respond(StatusCode::OK)
}

/// `200 OK` carrying `data` and `message`.
pub fn ok_with_message<T: Serialize>(data: T, message: &'static str) -> HttpResponse {
    Success::new(data)
        .with_message(message)
        .respond(StatusCode::OK)
}

/// `201 Created` carrying `data` and `message`.
pub fn created<T: Serialize>(data: T, message: &'static str) -> HttpResponse {
    Success::new(data)
        .with_message(message)
        .respond(StatusCode::CREATED)
}

/// Payload for endpoints that only confirm which row they touched.
#[derive(Debug, Serialize)]
pub struct Removed<'a> {
    pub id: &'a str,
}
