//! Envelope assertions.
//!
//! Every response carries `{"success": bool, ...}`. The dynamic helpers here
//! check that shape on a [`RecordedResponse`]; [`Envelope`] decodes it into a
//! typed payload for stricter checks.

use actix_web::http::StatusCode;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

use super::driver::RecordedResponse;

/// Typed view of a response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(String),
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a response body.
    ///
    /// # Errors
    /// Fails when the body is not an envelope, when a success lacks `data`
    /// or when a failure lacks `error`.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawEnvelope<T> = serde_json::from_slice(body)?;
        match (raw.success, raw.data, raw.error) {
            (true, Some(data), _) => Ok(Self::Success(data)),
            (true, None, _) => Err(serde_json::Error::custom("success envelope without data")),
            (false, _, Some(error)) => Ok(Self::Failure(error)),
            (false, _, None) => Err(serde_json::Error::custom("failure envelope without error")),
        }
    }

    /// Decode the body of `response`.
    ///
    /// # Panics
    /// Panics when the body is not a well-formed envelope.
    #[must_use]
    pub fn from_response(response: &RecordedResponse) -> Self {
        match Self::decode(&response.body) {
            Ok(envelope) => envelope,
            Err(err) => panic!("malformed envelope ({err}): {}", body_text(response)),
        }
    }

    /// Payload of a success.
    ///
    /// # Panics
    /// Panics on a failure envelope.
    #[must_use]
    pub fn into_success(self) -> T {
        match self {
            Self::Success(data) => data,
            Self::Failure(error) => panic!("expected success, got failure: {error}"),
        }
    }
}

/// Walk a dotted path such as `data.pagination.total`. Numeric segments
/// index arrays.
#[must_use]
pub fn field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(segment),
    })
}

fn body_text(response: &RecordedResponse) -> String {
    String::from_utf8_lossy(&response.body).into_owned()
}

/// Assert a failure envelope with `status` and, optionally, an `error`
/// containing `needle`.
///
/// # Panics
/// Panics when any expectation does not hold.
pub fn assert_failure(response: &RecordedResponse, status: StatusCode, needle: Option<&str>) {
    assert_eq!(
        response.status,
        status,
        "unexpected status; body: {}",
        body_text(response)
    );
    let body = response.json();
    assert_eq!(body.get("success"), Some(&Value::Bool(false)), "body: {body}");
    let error = body.get("error").and_then(Value::as_str).unwrap_or_default();
    if let Some(needle) = needle {
        assert!(
            error.contains(needle),
            "error {error:?} does not contain {needle:?}"
        );
    }
}

/// Assert a success envelope with `status` and return its `data`.
///
/// # Panics
/// Panics when any expectation does not hold.
pub fn assert_success(response: &RecordedResponse, status: StatusCode) -> Value {
    assert_eq!(
        response.status,
        status,
        "unexpected status; body: {}",
        body_text(response)
    );
    let mut body = response.json();
    assert_eq!(body.get("success"), Some(&Value::Bool(true)), "body: {body}");
    let data = body.get_mut("data").map(Value::take).unwrap_or_default();
    assert!(!data.is_null(), "success envelope carries no data");
    data
}

/// Assert a 200 list envelope holding `data.<collection>` and numeric
/// pagination, returning the items.
///
/// # Panics
/// Panics when any expectation does not hold.
pub fn assert_list(response: &RecordedResponse, collection: &str) -> Vec<Value> {
    let data = assert_success(response, StatusCode::OK);
    for key in ["total", "limit", "offset"] {
        let path = format!("pagination.{key}");
        assert!(
            field(&data, &path).is_some_and(Value::is_number),
            "{path} is not numeric in {data}"
        );
    }
    match data.get(collection) {
        Some(Value::Array(items)) => items.clone(),
        other => panic!("data.{collection} is not an array: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderMap;
    use actix_web::web::Bytes;
    use rstest::rstest;
    use serde_json::json;

    fn recorded(status: StatusCode, body: &Value) -> RecordedResponse {
        RecordedResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[rstest]
    #[case("data.pagination.total", Some(json!(4)))]
    #[case("data.products.1.id", Some(json!("b")))]
    #[case("data.products.9.id", None)]
    #[case("data.missing", None)]
    fn field_walks_objects_and_arrays(#[case] path: &str, #[case] expected: Option<Value>) {
        let body = json!({
            "data": {
                "products": [{"id": "a"}, {"id": "b"}],
                "pagination": {"total": 4},
            }
        });
        assert_eq!(field(&body, path).cloned(), expected);
    }

    #[rstest]
    fn envelope_decodes_both_arms() {
        let ok = Envelope::<Value>::decode(br#"{"success":true,"data":{"count":2}}"#)
            .expect("decode success");
        assert_eq!(ok, Envelope::Success(json!({"count": 2})));
        let failed = Envelope::<Value>::decode(br#"{"success":false,"error":"nope"}"#)
            .expect("decode failure");
        assert_eq!(failed, Envelope::Failure("nope".to_owned()));
    }

    #[rstest]
    #[case(br#"{"success":true}"#.as_slice())]
    #[case(br#"{"success":false}"#.as_slice())]
    #[case(b"not json".as_slice())]
    fn envelope_rejects_incomplete_bodies(#[case] body: &[u8]) {
        assert!(Envelope::<Value>::decode(body).is_err());
    }

    #[rstest]
    fn list_assertion_returns_items() {
        let response = recorded(
            StatusCode::OK,
            &json!({
                "success": true,
                "data": {
                    "reviews": [{"id": "r1"}],
                    "pagination": {"total": 1, "limit": 20, "offset": 0},
                }
            }),
        );
        assert_eq!(assert_list(&response, "reviews").len(), 1);
    }

    #[rstest]
    #[should_panic(expected = "does not contain")]
    fn failure_assertion_checks_the_message() {
        let response = recorded(
            StatusCode::BAD_REQUEST,
            &json!({"success": false, "error": "Product is out of stock"}),
        );
        assert_failure(&response, StatusCode::BAD_REQUEST, Some("Insufficient"));
    }
}
