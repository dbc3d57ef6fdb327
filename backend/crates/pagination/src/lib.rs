//! Offset pagination primitives shared by VaultKe list endpoints.
//!
//! List handlers accept optional `limit` and `offset` query parameters,
//! normalise them through [`PageRequest`], and report the window they served
//! alongside the total row count as [`PageInfo`].
//!
//! ```
//! use pagination::{PageInfo, PageParams, PageRequest};
//!
//! let request = PageRequest::try_from(PageParams { limit: None, offset: Some(40) })
//!     .expect("valid parameters");
//! assert_eq!(request.limit(), 20);
//!
//! let info = PageInfo::new(request, 45);
//! assert!(!info.has_more());
//! ```

use serde::{Deserialize, Serialize};

/// Page size used when a request omits `limit` or sends zero.
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound on page size; larger requests are clamped.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while normalising pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `limit` was below zero.
    #[error("limit must not be negative")]
    NegativeLimit,
    /// `offset` was below zero.
    #[error("offset must not be negative")]
    NegativeOffset,
}

/// Raw pagination parameters as they arrive on the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// Requested page size.
    pub limit: Option<i64>,
    /// Number of rows to skip.
    pub offset: Option<i64>,
}

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u32,
}

impl PageRequest {
    /// Build a request from already-validated values, clamping `limit`.
    #[must_use]
    pub fn new(limit: u32, offset: u32) -> Self {
        let limit = match limit {
            0 => DEFAULT_LIMIT,
            value => value.min(MAX_LIMIT),
        };
        Self { limit, offset }
    }

    /// Page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows skipped before the page starts.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

impl TryFrom<PageParams> for PageRequest {
    type Error = PaginationError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        let limit = match params.limit {
            None => DEFAULT_LIMIT,
            Some(value) if value < 0 => return Err(PaginationError::NegativeLimit),
            Some(value) => u32::try_from(value).unwrap_or(MAX_LIMIT),
        };
        let offset = match params.offset {
            None => 0,
            Some(value) if value < 0 => return Err(PaginationError::NegativeOffset),
            Some(value) => u32::try_from(value).unwrap_or(u32::MAX),
        };
        Ok(Self::new(limit, offset))
    }
}

/// Page metadata returned beside every list payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total number of rows matching the filter.
    pub total: u64,
    /// Page size that was applied.
    pub limit: u32,
    /// Offset that was applied.
    pub offset: u32,
}

impl PageInfo {
    /// Describe the page served for `request` out of `total` rows.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            total,
            limit: request.limit(),
            offset: request.offset(),
        }
    }

    /// Whether rows remain beyond this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.offset) + u64::from(self.limit) < self.total
    }
}

/// One page of rows together with the unpaged row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Rows matching the filter across all pages.
    pub total: u64,
}

impl<T> Paginated<T> {
    /// Bundle `items` with the overall `total`.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Metadata describing this page for `request`.
    #[must_use]
    pub fn info(&self, request: PageRequest) -> PageInfo {
        PageInfo::new(request, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 20, 0)]
    #[case(Some(5), Some(10), 5, 10)]
    #[case(Some(0), None, 20, 0)]
    #[case(Some(500), Some(3), 100, 3)]
    fn normalises_parameters(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u32,
    ) {
        let request = PageRequest::try_from(PageParams { limit, offset }).expect("valid params");
        assert_eq!(request.limit(), expected_limit);
        assert_eq!(request.offset(), expected_offset);
    }

    #[rstest]
    #[case(Some(-1), None, PaginationError::NegativeLimit)]
    #[case(None, Some(-5), PaginationError::NegativeOffset)]
    fn rejects_negative_values(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected: PaginationError,
    ) {
        let err = PageRequest::try_from(PageParams { limit, offset }).expect_err("invalid params");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn page_info_serialises_numeric_fields() {
        let info = PageInfo::new(PageRequest::new(10, 20), 25);
        let value = serde_json::to_value(info).expect("serialise page info");
        assert_eq!(value["total"], 25);
        assert_eq!(value["limit"], 10);
        assert_eq!(value["offset"], 20);
        assert!(!info.has_more());
    }

    #[rstest]
    fn has_more_when_rows_remain() {
        let info = PageInfo::new(PageRequest::default(), 21);
        assert!(info.has_more());
    }
}
