//! Shared request validation for inbound HTTP adapters.
//!
//! Extractor failures (malformed JSON, bad query strings, unknown routes)
//! are turned into domain errors here so they share the failure envelope
//! with handler errors.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use pagination::{PageParams, PageRequest, PaginationError};
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidBody,
    InvalidQuery,
    InvalidPath,
    InvalidTimestamp,
    InvalidPagination,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidBody => "invalid_body",
            Self::InvalidQuery => "invalid_query",
            Self::InvalidPath => "invalid_path",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidPagination => "invalid_pagination",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn rejected(message: impl Into<String>, code: ValidationCode, reason: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "code": code.as_str(),
        "reason": reason,
    }))
}

/// Body parser settings rejecting malformed JSON with the failure envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected request body");
        rejected(
            "Invalid request body",
            ValidationCode::InvalidBody,
            err.to_string(),
        )
        .into()
    })
}

/// Query string settings rejecting unparsable parameters.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected query string");
        rejected(
            "Invalid query parameters",
            ValidationCode::InvalidQuery,
            err.to_string(),
        )
        .into()
    })
}

/// Path segment settings rejecting unparsable identifiers.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        rejected(
            "Invalid path parameters",
            ValidationCode::InvalidPath,
            err.to_string(),
        )
        .into()
    })
}

/// Fallback for unknown routes.
///
/// # Errors
/// Always returns a not-found error naming the path.
pub async fn route_not_found(req: HttpRequest) -> Result<HttpResponse, Error> {
    Err(Error::not_found("Route not found").with_details(json!({
        "method": req.method().as_str(),
        "path": req.path(),
    })))
}

/// Normalise `limit` and `offset` query parameters.
///
/// # Errors
/// Negative values are rejected.
pub(crate) fn page_request(limit: Option<i64>, offset: Option<i64>) -> Result<PageRequest, Error> {
    PageRequest::try_from(PageParams { limit, offset }).map_err(|err| {
        let field = match err {
            PaginationError::NegativeLimit => "limit",
            PaginationError::NegativeOffset => "offset",
        };
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": field,
            "code": ValidationCode::InvalidPagination.as_str(),
        }))
    })
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be an RFC 3339 timestamp")).with_details(json!({
        "field": field,
        "value": value,
        "code": ValidationCode::InvalidTimestamp.as_str(),
    }))
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, value))
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// Treat blank query values as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 20, 0)]
    #[case(Some(5), Some(15), 5, 15)]
    #[case(Some(1_000), None, 100, 0)]
    fn page_request_applies_defaults_and_cap(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u32,
    ) {
        let page = page_request(limit, offset).expect("valid page");
        assert_eq!(page.limit(), expected_limit);
        assert_eq!(page.offset(), expected_offset);
    }

    #[rstest]
    #[case(Some(-1), None, "limit")]
    #[case(None, Some(-3), "offset")]
    fn negative_paging_names_the_field(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] field: &str,
    ) {
        let err = page_request(limit, offset).expect_err("negative paging");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], field);
    }

    #[test]
    fn timestamps_accept_offsets_and_blank_means_absent() {
        let field = FieldName::new("scheduledAt");
        let parsed = parse_optional_rfc3339_timestamp(Some("2026-03-01T10:00:00+03:00"), field)
            .expect("valid timestamp")
            .expect("present");
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T07:00:00+00:00");
        assert_eq!(
            parse_optional_rfc3339_timestamp(Some("  "), field).expect("blank"),
            None
        );
    }

    #[test]
    fn malformed_timestamps_report_the_field() {
        let err = parse_rfc3339_timestamp("tomorrow", FieldName::new("expiresAt"))
            .expect_err("malformed");
        assert_eq!(err.message(), "expiresAt must be an RFC 3339 timestamp");
        assert_eq!(err.details().expect("details")["value"], "tomorrow");
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some(" crafts "), Some("crafts"))]
    fn blank_values_are_absent(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(non_blank(raw.map(str::to_owned)).as_deref(), expected);
    }
}
