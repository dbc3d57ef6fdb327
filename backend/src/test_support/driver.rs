//! Request driver: one test case in, one recorded exchange out.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::{self, HeaderMap};
use actix_web::http::{Method, StatusCode};
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::web::Bytes;
use serde_json::Value;

use crate::domain::Role;

/// Bearer token presented for [`Role::User`].
pub const USER_TOKEN: &str = "test-user-token";
/// Bearer token presented for [`Role::Admin`].
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Precomputed token for `role`.
#[must_use]
pub const fn token_for(role: Role) -> &'static str {
    match role {
        Role::User => USER_TOKEN,
        Role::Admin => ADMIN_TOKEN,
    }
}

/// Method, path, optional JSON body and optional acting role.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path including any query string.
    pub path: String,
    pub body: Option<Value>,
    pub role: Option<Role>,
}

impl RequestSpec {
    /// Request without a body or token.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            role: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body. `null` counts as no body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = (!body.is_null()).then_some(body);
        self
    }

    /// Present the token for `role`.
    #[must_use]
    pub fn as_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Build the actix test request.
    #[must_use]
    pub fn to_request(&self) -> Request {
        let mut request = TestRequest::default()
            .method(self.method.clone())
            .uri(&self.path);
        if let Some(body) = &self.body {
            request = request
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .set_payload(body.to_string());
        }
        if let Some(role) = self.role {
            request = request.insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(role)),
            ));
        }
        request.to_request()
    }
}

/// Status, headers and raw body of one exchange.
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedResponse {
    /// Decode the body as JSON.
    ///
    /// # Panics
    /// Panics when the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        match serde_json::from_slice(&self.body) {
            Ok(value) => value,
            Err(err) => panic!(
                "response body is not JSON ({err}): {}",
                String::from_utf8_lossy(&self.body)
            ),
        }
    }

    /// Header value as text, if present and printable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Send `spec` through `app` and record the response.
pub async fn send<S, B>(app: &S, spec: &RequestSpec) -> RecordedResponse
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, spec.to_request()).await;
    let status = response.status();
    let headers = response.headers().clone();
    let body = actix_test::read_body(response).await;
    RecordedResponse {
        status,
        headers,
        body,
    }
}
